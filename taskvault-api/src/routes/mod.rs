/// API route handlers
///
/// - `health`: Health check endpoint
/// - `users`: Registration, login/logout, profile CRUD
/// - `tasks`: Owner-scoped task CRUD
///
/// The helpers below implement the allow-listed update discipline shared
/// by the profile and task PATCH endpoints: the raw JSON object is
/// checked against a fixed field list before anything is validated or
/// written, and one disallowed key rejects the whole update.

use crate::error::{ApiError, ValidationErrorDetail};
use serde_json::{Map, Value};

pub mod health;
pub mod tasks;
pub mod users;

/// Rejects the update wholesale if any key is outside the allow-list
pub(crate) fn ensure_allowed_fields(
    body: &Map<String, Value>,
    allowed: &[&str],
) -> Result<(), ApiError> {
    if body.keys().any(|key| !allowed.contains(&key.as_str())) {
        return Err(ApiError::InvalidOperation("Invalid updates.".to_string()));
    }
    Ok(())
}

/// Builds a single-field validation error
pub(crate) fn validation_error(field: &str, message: impl Into<String>) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: field.to_string(),
        message: message.into(),
    }])
}

/// Extracts a string value or fails validation for that field
pub(crate) fn expect_string<'a>(value: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_str()
        .ok_or_else(|| validation_error(field, format!("{} must be a string", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().expect("Should be an object").clone()
    }

    #[test]
    fn test_allowed_fields_pass() {
        let body = body(json!({ "description": "x", "completed": true }));
        assert!(ensure_allowed_fields(&body, &["description", "completed"]).is_ok());
    }

    #[test]
    fn test_empty_update_is_allowed() {
        let body = body(json!({}));
        assert!(ensure_allowed_fields(&body, &["description", "completed"]).is_ok());
    }

    #[test]
    fn test_one_disallowed_field_rejects_everything() {
        let body = body(json!({ "description": "x", "owner": "someone-else" }));
        let result = ensure_allowed_fields(&body, &["description", "completed"]);

        assert!(matches!(result, Err(ApiError::InvalidOperation(_))));
    }

    #[test]
    fn test_expect_string() {
        assert_eq!(expect_string(&json!("hello"), "field").unwrap(), "hello");
        assert!(expect_string(&json!(42), "field").is_err());
        assert!(expect_string(&json!(null), "field").is_err());
    }
}
