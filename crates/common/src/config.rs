use std::time::Duration;

use crate::error::AppError;

/// Default homework-status endpoint.
pub const DEFAULT_PRACTICUM_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Default pause between polling cycles, in seconds.
pub const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OAuth token for the homework API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives status notifications
    pub telegram_chat_id: String,

    /// Homework-status endpoint URL
    pub practicum_endpoint: String,

    /// Telegram Bot API base URL (default: public api.telegram.org)
    pub telegram_api_url: String,

    /// Pause between polling cycles in seconds (default: 600)
    pub retry_period_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Every required secret that is unset or blank is collected and reported in
    /// a single `AppError::Config`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let practicum_token = lookup("PRACTICUM_TOKEN");
        let telegram_token = lookup("TELEGRAM_TOKEN");
        let telegram_chat_id = lookup("TELEGRAM_CHAT_ID");

        let (practicum_token, telegram_token, telegram_chat_id) = check_tokens(
            practicum_token,
            telegram_token,
            telegram_chat_id,
        )?;

        let retry_period_secs = match lookup("RETRY_PERIOD_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(AppError::Config(
                        "RETRY_PERIOD_SECS must be a positive integer".to_string(),
                    ));
                }
            },
            None => DEFAULT_RETRY_PERIOD_SECS,
        };

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            practicum_endpoint: lookup("PRACTICUM_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PRACTICUM_ENDPOINT.to_string()),
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            retry_period_secs,
        })
    }

    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }
}

/// Check that all three secrets are present and non-blank.
pub fn check_tokens(
    practicum_token: Option<String>,
    telegram_token: Option<String>,
    telegram_chat_id: Option<String>,
) -> Result<(String, String, String), AppError> {
    let present =
        |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    let missing: Vec<&str> = [
        ("PRACTICUM_TOKEN", &practicum_token),
        ("TELEGRAM_TOKEN", &telegram_token),
        ("TELEGRAM_CHAT_ID", &telegram_chat_id),
    ]
    .into_iter()
    .filter(|(_, value)| !present(*value))
    .map(|(name, _)| name)
    .collect();

    match (practicum_token, telegram_token, telegram_chat_id) {
        (Some(practicum), Some(telegram), Some(chat)) if missing.is_empty() => {
            Ok((practicum, telegram, chat))
        }
        _ => Err(AppError::Config(format!(
            "missing required environment variables: {}",
            missing.join(", ")
        ))),
    }
}
