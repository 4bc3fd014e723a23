//! Error Handling Module
//!
//! - Core error type (`FetchError`)
//! - Normalization of failures into the single human-readable message that
//!   request state and chat notices surface
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use nudge_client::error::{FetchError, normalize_message};
//!
//! let error = FetchError::api_error(429, "rate_limited");
//! assert_eq!(normalize_message(&error), "rate_limited");
//! assert!(error.is_retryable());
//! ```

mod conversions;
pub mod normalize;
pub mod types;

pub use normalize::*;
pub use types::*;
