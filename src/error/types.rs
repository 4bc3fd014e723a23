//! Core error types.

use thiserror::Error;

/// Errors produced while issuing a request or interpreting its response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Non-2xx response whose body carried a structured `error` field.
    #[error("{message}")]
    ApiError {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Non-2xx response without a structured error body.
    #[error("Request failed with status code {status}")]
    HttpStatus {
        status: u16,
        details: Option<serde_json::Value>,
    },

    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("{0}")]
    TransportError(String),

    #[error("Request timed out: {0}")]
    TimeoutError(String),

    /// A success response whose body could not be decoded.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Anything that does not fit the categories above. The message may be empty.
    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    /// Create a structured API error.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Create a structured API error carrying the decoded response body.
    pub fn api_error_with_details(
        status: u16,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
            details: Some(details),
        }
    }

    /// HTTP status associated with the failure, if a response was received.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } | Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded response body attached to the failure, if any.
    pub const fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ApiError { details, .. } | Self::HttpStatus { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Whether resending the same request may plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportError(_) | Self::TimeoutError(_) => true,
            Self::ApiError { status, .. } | Self::HttpStatus { status, .. } => {
                *status == 408 || *status == 429 || (500..=599).contains(status)
            }
            _ => false,
        }
    }

    /// Message suitable for display to an end user.
    pub fn user_message(&self) -> String {
        super::normalize::normalize_message(self)
    }
}
