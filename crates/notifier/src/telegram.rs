use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use homework_common::error::AppError;

use crate::Notifier;

/// Sends messages to one chat via the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope every Bot API reply is wrapped in.
#[derive(Debug, Deserialize)]
struct BotApiReply {
    ok: bool,
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), AppError> {
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        // The URL embeds the bot token, so transport errors are reported without it.
        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Notification(e.without_url().to_string()))?;

        let status = response.status();
        let reply = response.json::<BotApiReply>().await.ok();

        match reply {
            Some(BotApiReply { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotApiReply {
                description: Some(description),
                ..
            }) => Err(AppError::Notification(description)),
            _ => Err(AppError::Notification(format!(
                "sendMessage failed with HTTP {}",
                status.as_u16()
            ))),
        }
    }
}
