//! Response validator — shape gate between the API client and the formatter.
//!
//! Rules are checked in order and the first violation wins:
//! 1. the payload is a JSON object
//! 2. it has a `homeworks` key
//! 3. `homeworks` is an array
//!
//! A passing payload is returned unchanged, wrapped in `ValidatedResponse`.

use serde_json::Value;

use homework_common::error::{AppError, ShapeError};
use homework_common::types::ValidatedResponse;

/// Check that `payload` has the documented shape.
pub fn check_response(payload: Value) -> Result<ValidatedResponse, AppError> {
    let Value::Object(map) = payload else {
        return Err(ShapeError::NotAMapping.into());
    };

    match map.get("homeworks") {
        None => {
            tracing::error!("Response is missing the `homeworks` key");
            Err(ShapeError::MissingHomeworks.into())
        }
        Some(Value::Array(_)) => {
            tracing::debug!("Response shape is valid");
            Ok(ValidatedResponse::new_unchecked(map))
        }
        Some(_) => Err(ShapeError::HomeworksNotAList.into()),
    }
}
