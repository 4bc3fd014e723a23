//! Type Conversions for FetchError
//!
//! From trait implementations for converting common error types into FetchError.

use super::types::FetchError;

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                details: None,
            }
        } else {
            Self::TransportError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}
