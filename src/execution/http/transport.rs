//! HTTP transport abstraction.
//!
//! Executors never talk to `reqwest` directly; they hand a fully merged
//! request to an injectable [`HttpTransport`]. The default implementation is
//! [`super::ReqwestTransport`]; tests substitute scripted transports.

use crate::error::FetchError;
use crate::execution::request::{HttpMethod, RequestConfig};
use async_trait::async_trait;
use std::collections::HashMap;

/// Context describing one outgoing request, shared with interceptors.
#[derive(Debug, Clone)]
pub struct HttpRequestContext {
    pub request_id: String,
    pub target: String,
    pub method: HttpMethod,
}

/// Generate a unique request id for correlating log lines.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Transport-level request data.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    pub ctx: HttpRequestContext,
    pub target: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl HttpTransportRequest {
    pub fn from_config(config: RequestConfig) -> Self {
        let ctx = HttpRequestContext {
            request_id: generate_request_id(),
            target: config.target.clone(),
            method: config.method,
        };
        Self {
            ctx,
            target: config.target,
            method: config.method,
            headers: config.headers,
            body: config.body,
        }
    }
}

/// Transport-level response data. Non-2xx statuses are returned, not raised.
#[derive(Debug, Clone, Default)]
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpTransportResponse {
    /// Build a JSON response; handy for synthetic transports.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: HashMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: body.to_string().into_bytes(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends one request and returns its raw response.
///
/// Implementations return `Err` only when no response was obtained; HTTP
/// error statuses are classified by the executor.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpTransportRequest)
    -> Result<HttpTransportResponse, FetchError>;
}
