//! Failure normalization
//!
//! Every failed settle surfaces exactly one human-readable message. The
//! precedence is fixed:
//! 1. a structured `error` string embedded in the response body,
//! 2. the generic transport/exception message,
//! 3. [`FALLBACK_ERROR_MESSAGE`].

use super::types::FetchError;
use serde_json::Value;

pub use crate::defaults::messages::FALLBACK_ERROR_MESSAGE;

/// Extract a non-blank `error` string from a response body.
pub fn structured_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Classify a non-2xx response into a typed failure.
///
/// Bodies carrying `{"error": "..."}` become [`FetchError::ApiError`] with that
/// message verbatim; everything else becomes [`FetchError::HttpStatus`].
pub fn classify_response(status: u16, body: &[u8]) -> FetchError {
    let text = String::from_utf8_lossy(body);
    match serde_json::from_slice::<Value>(body) {
        Ok(json) => match structured_message(&json) {
            Some(message) => FetchError::api_error_with_details(status, message, json),
            None => FetchError::HttpStatus {
                status,
                details: Some(json),
            },
        },
        Err(_) if text.trim().is_empty() => FetchError::HttpStatus {
            status,
            details: None,
        },
        Err(_) => FetchError::HttpStatus {
            status,
            details: Some(serde_json::json!({ "raw": text.chars().take(200).collect::<String>() })),
        },
    }
}

/// Normalize any failure into the message stored in request state.
pub fn normalize_message(error: &FetchError) -> String {
    if let Some(message) = error.details().and_then(structured_message) {
        return message;
    }
    if let FetchError::ApiError { message, .. } = error
        && !message.trim().is_empty()
    {
        return message.clone();
    }
    let generic = error.to_string();
    if generic.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_body_wins() {
        let err = classify_response(500, br#"{"error":"rate_limited"}"#);
        assert!(matches!(err, FetchError::ApiError { status: 500, .. }));
        assert_eq!(normalize_message(&err), "rate_limited");
    }

    #[test]
    fn structured_details_take_precedence_over_generic_message() {
        let err = FetchError::HttpStatus {
            status: 503,
            details: Some(serde_json::json!({ "error": "maintenance" })),
        };
        assert_eq!(normalize_message(&err), "maintenance");
    }

    #[test]
    fn non_structured_body_uses_generic_message() {
        let err = classify_response(502, b"<html>bad gateway</html>");
        assert_eq!(normalize_message(&err), "Request failed with status code 502");

        let err = classify_response(500, br#"{"error":{"code":1}}"#);
        assert_eq!(normalize_message(&err), "Request failed with status code 500");
    }

    #[test]
    fn blank_structured_error_is_ignored() {
        let err = classify_response(400, br#"{"error":"   "}"#);
        assert!(matches!(err, FetchError::HttpStatus { status: 400, .. }));
    }

    #[test]
    fn empty_messages_fall_back() {
        assert_eq!(
            normalize_message(&FetchError::Unknown(String::new())),
            FALLBACK_ERROR_MESSAGE
        );
        assert_eq!(
            normalize_message(&FetchError::TransportError("  ".into())),
            FALLBACK_ERROR_MESSAGE
        );
    }

    #[test]
    fn transport_message_passes_through() {
        let err = FetchError::TransportError("connection refused".into());
        assert_eq!(normalize_message(&err), "connection refused");
    }
}
