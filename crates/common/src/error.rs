use thiserror::Error;

/// Ways a homework response can fail the shape check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("response is not a mapping")]
    NotAMapping,

    #[error("response is missing the `homeworks` key")]
    MissingHomeworks,

    #[error("`homeworks` is not a list")]
    HomeworksNotAList,
}

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Endpoint {endpoint} unavailable: HTTP {status}")]
    EndpointUnavailable { endpoint: String, status: u16 },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unexpected response shape: {0}")]
    Shape(#[from] ShapeError),

    #[error("Homework record is missing field `{0}`")]
    MissingField(&'static str),

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl AppError {
    /// Only configuration problems stop the process; everything else is retried
    /// on the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}
