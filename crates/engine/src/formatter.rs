//! Status formatter — turns a raw homework record into the chat message.

use serde_json::Value;

use homework_common::error::AppError;
use homework_common::types::HomeworkStatus;

/// Build the notification text for a homework record.
///
/// Fails with `MissingField` when `homework_name` or `status` is absent, null or
/// not a string, and with `UnknownStatus` when the status is not in the verdict table.
pub fn parse_status(homework: &Value) -> Result<String, AppError> {
    let homework_name = required_str(homework, "homework_name")?;
    let code = required_str(homework, "status")?;

    let status = HomeworkStatus::from_code(code)
        .ok_or_else(|| AppError::UnknownStatus(code.to_string()))?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        homework_name,
        status.verdict()
    ))
}

fn required_str<'a>(homework: &'a Value, field: &'static str) -> Result<&'a str, AppError> {
    homework
        .get(field)
        .and_then(Value::as_str)
        .ok_or(AppError::MissingField(field))
}
