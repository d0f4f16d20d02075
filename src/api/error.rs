//! Typed errors for challenge service calls.
//!
//! The gateway maps every failed round-trip into one of three kinds. The
//! server reports failures as JSON with an `error` string, which is used
//! verbatim as the message when present.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure or no usable response.
    #[error("{0}")]
    Network(String),
    /// 4xx with a structured message (bad payload, unsolvable system).
    #[error("{0}")]
    Validation(String),
    /// Referenced task_id does not exist server-side.
    #[error("{0}")]
    NotFound(String),
}

/// Pull the `error` field out of a failure body, if it is the JSON shape the
/// service uses.
fn server_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(|s| s.to_string())
}

/// Classify a non-success HTTP response.
pub fn from_status(status: u16, body: &str) -> ApiError {
    let detail = server_detail(body);
    match status {
        404 => ApiError::NotFound(detail.unwrap_or_else(|| "Task not found".to_string())),
        400..=499 => ApiError::Validation(
            detail.unwrap_or_else(|| format!("Request rejected (HTTP {})", status)),
        ),
        _ => ApiError::Network(
            detail.unwrap_or_else(|| format!("Server error (HTTP {})", status)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_uses_server_detail() {
        let err = from_status(404, r#"{"error": "Task not found"}"#);
        assert_eq!(err, ApiError::NotFound("Task not found".to_string()));
    }

    #[test]
    fn validation_uses_server_detail_verbatim() {
        let err = from_status(
            400,
            r#"{"error": "Could not solve the system with provided parameters"}"#,
        );
        assert_eq!(
            err,
            ApiError::Validation("Could not solve the system with provided parameters".to_string())
        );
    }

    #[test]
    fn validation_falls_back_to_generic_message() {
        let err = from_status(422, "not json at all");
        assert_eq!(err, ApiError::Validation("Request rejected (HTTP 422)".to_string()));
    }

    #[test]
    fn server_errors_map_to_network() {
        let err = from_status(500, r#"{"error": "Could not generate a valid ODE task"}"#);
        assert_eq!(
            err,
            ApiError::Network("Could not generate a valid ODE task".to_string())
        );
        let err = from_status(502, "<html>bad gateway</html>");
        assert_eq!(err, ApiError::Network("Server error (HTTP 502)".to_string()));
    }
}
