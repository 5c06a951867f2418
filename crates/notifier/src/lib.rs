//! Chat notification delivery.
//!
//! `Notifier` is the transport seam; `TelegramNotifier` delivers through the
//! Telegram Bot API. `notify` is what the poller calls: it never fails.

pub mod telegram;

use async_trait::async_trait;

use homework_common::error::AppError;

pub use telegram::TelegramNotifier;

/// A channel that can deliver a text message to the configured chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), AppError>;
}

/// Send `message`, logging the outcome. Delivery failures are swallowed.
///
/// Returns whether the transport accepted the message.
pub async fn notify(notifier: &dyn Notifier, message: &str) -> bool {
    match notifier.send(message).await {
        Ok(()) => {
            tracing::debug!(message, "Message sent to chat");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to send message to chat");
            false
        }
    }
}
