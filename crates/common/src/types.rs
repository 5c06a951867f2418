use chrono::Utc;
use serde_json::{Map, Value};

/// Review status reported for a homework submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Look up a raw status code from the API. Returns `None` for codes outside
    /// the verdict table.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    pub fn code(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Localized verdict text shown to the learner.
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Lower bound (Unix seconds) of the next fetch window.
///
/// Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(i64);

impl Cursor {
    pub fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Cursor positioned at the current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn timestamp(&self) -> i64 {
        self.0
    }

    /// Move to `timestamp` if it is not behind the current position.
    /// Returns `true` when the cursor changed.
    pub fn advance_to(&mut self, timestamp: i64) -> bool {
        if timestamp > self.0 {
            self.0 = timestamp;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A response payload that passed the shape check. The object is kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    /// `homeworks` is guaranteed to hold an array.
    payload: Map<String, Value>,
}

impl ValidatedResponse {
    /// Wrap a payload whose `homeworks` key is already known to hold an array.
    /// Intended for the validator; other callers should go through it.
    pub fn new_unchecked(payload: Map<String, Value>) -> Self {
        Self { payload }
    }

    /// Homework entries, most recent first.
    pub fn homeworks(&self) -> &[Value] {
        self.payload
            .get("homeworks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Most recent homework entry, if any.
    pub fn latest(&self) -> Option<&Value> {
        self.homeworks().first()
    }

    /// Server-reported timestamp to use as the next cursor.
    pub fn current_date(&self) -> Option<i64> {
        self.payload.get("current_date").and_then(Value::as_i64)
    }
}
