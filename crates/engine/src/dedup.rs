//! Duplicate suppression — remembers the last message sent to the chat.
//!
//! Status updates and error reports share one memo, so an identical message on
//! consecutive cycles is sent once. State lives only for the process lifetime.

/// Last-notified message memo.
#[derive(Debug, Default, Clone)]
pub struct LastNotified {
    last: Option<String>,
}

impl LastNotified {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `message` differs from the last one recorded.
    pub fn should_send(&self, message: &str) -> bool {
        let allowed = self.last.as_deref() != Some(message);

        if !allowed {
            tracing::debug!("Message suppressed — identical to the last notification");
        }

        allowed
    }

    /// Record `message` as the most recent notification.
    pub fn record(&mut self, message: impl Into<String>) {
        self.last = Some(message.into());
    }
}
