use std::time::Duration;

use homework_common::error::AppError;
use homework_common::types::Cursor;
use homework_engine::dedup::LastNotified;
use homework_engine::formatter::parse_status;
use homework_engine::validator::check_response;
use homework_notifier::{Notifier, notify};

use crate::client::HomeworkSource;

/// Mutable state carried from one cycle to the next. Never persisted.
#[derive(Debug, Clone)]
pub struct PollState {
    pub cursor: Cursor,
    pub last_notified: LastNotified,
}

impl PollState {
    pub fn new(cursor: Cursor) -> Self {
        Self {
            cursor,
            last_notified: LastNotified::new(),
        }
    }
}

/// What a single cycle ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A status message was handed to the notifier.
    Notified(String),
    /// The latest status message equals the last one sent.
    Suppressed,
    /// The response carried no homework entries.
    NoUpdates,
    /// The cycle failed; carries the diagnostic text.
    Failed(String),
}

/// Polls the homework API and forwards status changes to the chat.
pub struct StatusPoller<S, N> {
    source: S,
    notifier: N,
    retry_period: Duration,
    state: PollState,
}

impl<S, N> StatusPoller<S, N>
where
    S: HomeworkSource,
    N: Notifier,
{
    /// Create a poller whose cursor starts at the current time.
    pub fn new(source: S, notifier: N, retry_period: Duration) -> Self {
        Self::with_state(source, notifier, retry_period, PollState::new(Cursor::now()))
    }

    pub fn with_state(source: S, notifier: N, retry_period: Duration, state: PollState) -> Self {
        Self {
            source,
            notifier,
            retry_period,
            state,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Start the polling loop. Runs until the task is cancelled.
    pub async fn run(&mut self) {
        tracing::info!(
            cursor = %self.state.cursor,
            retry_period_secs = self.retry_period.as_secs(),
            "Homework poller started"
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// Run one fetch → validate → format → notify cycle, recovering from any
    /// failure. Does not sleep.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.poll_once().await {
            Ok(outcome) => outcome,
            Err(e) => self.recover(e).await,
        }
    }

    async fn poll_once(&mut self) -> Result<CycleOutcome, AppError> {
        let payload = self.source.fetch_updates(self.state.cursor).await?;
        let response = check_response(payload)?;

        let outcome = match response.latest() {
            Some(homework) => {
                let message = parse_status(homework)?;
                if self.state.last_notified.should_send(&message) {
                    notify(&self.notifier, &message).await;
                    self.state.last_notified.record(message.clone());
                    CycleOutcome::Notified(message)
                } else {
                    CycleOutcome::Suppressed
                }
            }
            None => {
                tracing::debug!("No new homework statuses");
                CycleOutcome::NoUpdates
            }
        };

        match response.current_date() {
            Some(current_date) => {
                if self.state.cursor.advance_to(current_date) {
                    tracing::debug!(cursor = %self.state.cursor, "Cursor advanced");
                }
            }
            None => tracing::debug!("current_date missing or not an integer, cursor unchanged"),
        }

        Ok(outcome)
    }

    async fn recover(&mut self, error: AppError) -> CycleOutcome {
        let message = format!("Сбой в работе программы: {}", error);
        tracing::error!(error = %error, "Polling cycle failed");

        if self.state.last_notified.should_send(&message) {
            notify(&self.notifier, &message).await;
            self.state.last_notified.record(message.clone());
        }

        CycleOutcome::Failed(message)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;

    /// Replays scripted responses and records the cursor of every call.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        responses: Arc<Mutex<VecDeque<Result<Value, AppError>>>>,
        cursors: Arc<Mutex<Vec<i64>>>,
    }

    impl ScriptedSource {
        fn push(&self, response: Result<Value, AppError>) {
            self.responses.lock().unwrap().push_back(response);
        }
    }

    #[async_trait]
    impl HomeworkSource for ScriptedSource {
        async fn fetch_updates(&self, cursor: Cursor) -> Result<Value, AppError> {
            self.cursors.lock().unwrap().push(cursor.timestamp());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({"homeworks": []})))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), AppError> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(AppError::Notification("Forbidden: bot was blocked".into()))
            } else {
                Ok(())
            }
        }
    }

    const APPROVED: &str = "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

    fn approved_payload() -> Value {
        json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1_700_000_000
        })
    }

    fn poller(
        source: &ScriptedSource,
        notifier: &RecordingNotifier,
    ) -> StatusPoller<ScriptedSource, RecordingNotifier> {
        StatusPoller::with_state(
            source.clone(),
            notifier.clone(),
            Duration::from_secs(600),
            PollState::new(Cursor::new(1_600_000_000)),
        )
    }

    #[tokio::test]
    async fn test_status_change_is_sent_and_cursor_advances() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(approved_payload()));
        let mut poller = poller(&source, &notifier);

        let outcome = poller.run_cycle().await;

        assert_eq!(outcome, CycleOutcome::Notified(APPROVED.to_string()));
        assert_eq!(*notifier.sent.lock().unwrap(), vec![APPROVED.to_string()]);
        assert_eq!(poller.state().cursor.timestamp(), 1_700_000_000);
        assert_eq!(*source.cursors.lock().unwrap(), vec![1_600_000_000]);
    }

    #[tokio::test]
    async fn test_next_fetch_uses_server_cursor() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(approved_payload()));
        let mut poller = poller(&source, &notifier);

        poller.run_cycle().await;
        poller.run_cycle().await;

        assert_eq!(
            *source.cursors.lock().unwrap(),
            vec![1_600_000_000, 1_700_000_000]
        );
    }

    #[tokio::test]
    async fn test_empty_homeworks_sends_nothing_but_advances() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(json!({"homeworks": [], "current_date": 1_650_000_000})));
        let mut poller = poller(&source, &notifier);

        assert_eq!(poller.run_cycle().await, CycleOutcome::NoUpdates);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(poller.state().cursor.timestamp(), 1_650_000_000);
    }

    #[tokio::test]
    async fn test_identical_status_is_sent_once() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(approved_payload()));
        source.push(Ok(approved_payload()));
        let mut poller = poller(&source, &notifier);

        poller.run_cycle().await;
        assert_eq!(poller.run_cycle().await, CycleOutcome::Suppressed);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_changed_status_is_sent_again() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(json!({"homeworks": [{"homework_name": "hw1", "status": "reviewing"}]})));
        source.push(Ok(approved_payload()));
        let mut poller = poller(&source, &notifier);

        poller.run_cycle().await;
        poller.run_cycle().await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].ends_with("Работа взята на проверку ревьюером."));
        assert_eq!(sent[1], APPROVED);
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_and_cursor_kept() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Err(AppError::Transport("connection refused".into())));
        let mut poller = poller(&source, &notifier);

        let outcome = poller.run_cycle().await;

        let expected = "Сбой в работе программы: Transport error: connection refused";
        assert_eq!(outcome, CycleOutcome::Failed(expected.to_string()));
        assert_eq!(*notifier.sent.lock().unwrap(), vec![expected.to_string()]);
        assert_eq!(poller.state().cursor.timestamp(), 1_600_000_000);
    }

    #[tokio::test]
    async fn test_repeated_error_is_reported_once() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        for _ in 0..3 {
            source.push(Err(AppError::EndpointUnavailable {
                endpoint: "https://example.test/".into(),
                status: 500,
            }));
        }
        let mut poller = poller(&source, &notifier);

        for _ in 0..3 {
            assert!(matches!(poller.run_cycle().await, CycleOutcome::Failed(_)));
        }
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_record_does_not_advance_cursor() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(json!({
            "homeworks": [{"status": "approved"}],
            "current_date": 1_700_000_000
        })));
        let mut poller = poller(&source, &notifier);

        let outcome = poller.run_cycle().await;

        assert!(matches!(outcome, CycleOutcome::Failed(ref m) if m.contains("homework_name")));
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Сбой в работе программы:"));
        assert_eq!(poller.state().cursor.timestamp(), 1_600_000_000);
    }

    #[tokio::test]
    async fn test_unknown_status_is_a_failure() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(json!({"homeworks": [{"homework_name": "hw1", "status": "lost"}]})));
        let mut poller = poller(&source, &notifier);

        let outcome = poller.run_cycle().await;
        assert!(matches!(outcome, CycleOutcome::Failed(ref m) if m.contains("Unknown homework status: lost")));
    }

    #[tokio::test]
    async fn test_bad_shape_is_a_failure() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(json!({"current_date": 1_700_000_000})));
        let mut poller = poller(&source, &notifier);

        assert!(matches!(poller.run_cycle().await, CycleOutcome::Failed(_)));
        assert_eq!(poller.state().cursor.timestamp(), 1_600_000_000);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_stop_cursor() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        source.push(Ok(approved_payload()));
        source.push(Ok(approved_payload()));
        let mut poller = poller(&source, &notifier);

        assert_eq!(
            poller.run_cycle().await,
            CycleOutcome::Notified(APPROVED.to_string())
        );
        assert_eq!(poller.state().cursor.timestamp(), 1_700_000_000);
        // The attempt still counts for duplicate suppression.
        assert_eq!(poller.run_cycle().await, CycleOutcome::Suppressed);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_float_current_date_keeps_cursor() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(json!({"homeworks": [], "current_date": 1.5e9})));
        let mut poller = poller(&source, &notifier);

        assert_eq!(poller.run_cycle().await, CycleOutcome::NoUpdates);
        assert_eq!(poller.state().cursor.timestamp(), 1_600_000_000);
    }

    #[tokio::test]
    async fn test_run_retries_after_failure() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Err(AppError::Transport("connection reset".into())));
        let mut poller = StatusPoller::with_state(
            source.clone(),
            notifier.clone(),
            Duration::from_millis(10),
            PollState::new(Cursor::new(1_600_000_000)),
        );

        let result = tokio::time::timeout(Duration::from_millis(100), poller.run()).await;
        assert!(result.is_err(), "run() only stops when cancelled");

        let cursors = source.cursors.lock().unwrap();
        assert!(cursors.len() >= 2, "expected a retry, got {:?}", cursors);
        assert!(cursors.iter().all(|&c| c == 1_600_000_000));

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec!["Сбой в работе программы: Transport error: connection reset".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stale_current_date_does_not_rewind() {
        let source = ScriptedSource::default();
        let notifier = RecordingNotifier::default();
        source.push(Ok(json!({"homeworks": [], "current_date": 1_500_000_000})));
        let mut poller = poller(&source, &notifier);

        poller.run_cycle().await;
        assert_eq!(poller.state().cursor.timestamp(), 1_600_000_000);
    }
}
