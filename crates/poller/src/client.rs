//! Homework API client.
//!
//! One authenticated GET per cycle against the homework-status endpoint,
//! filtered server-side by the `from_date` cursor.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use homework_common::error::AppError;
use homework_common::types::Cursor;

/// Source of raw homework-status payloads.
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch homework updates newer than `cursor` as raw JSON.
    async fn fetch_updates(&self, cursor: Cursor) -> Result<Value, AppError>;
}

/// HTTP client for the Practicum homework-status API.
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, cursor: Cursor) -> reqwest::RequestBuilder {
        self.client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", cursor.timestamp())])
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch_updates(&self, cursor: Cursor) -> Result<Value, AppError> {
        tracing::debug!(endpoint = %self.endpoint, %cursor, "Requesting homework statuses");

        let response = self.build_request(cursor).send().await.map_err(|e| {
            tracing::error!(
                endpoint = %self.endpoint,
                error = %e,
                "Homework endpoint unreachable"
            );
            AppError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "Homework endpoint unavailable"
            );
            return Err(AppError::EndpointUnavailable {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Decode(e.to_string()))
    }
}
