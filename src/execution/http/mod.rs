//! HTTP Utilities
//!
//! - Transport abstraction and the default `reqwest` implementation
//! - Header management
//! - HTTP interceptors

pub mod client;
pub mod headers;
pub mod interceptor;
pub mod transport;

pub use client::*;
pub use headers::*;
pub use interceptor::*;
pub use transport::*;
