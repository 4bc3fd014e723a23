//! HTTP Interceptor interfaces
//!
//! Interceptors can observe and tweak request builders before send, observe
//! responses, and be notified of transport errors. Hooks are best-effort and
//! should avoid expensive work.

use super::transport::{HttpRequestContext, HttpTransportResponse};
use crate::error::FetchError;
use reqwest::header::HeaderMap;

pub trait HttpInterceptor: Send + Sync {
    /// Called before sending. Return the (possibly modified) builder or an
    /// error to short-circuit the request.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        builder: reqwest::RequestBuilder,
        _headers: &HeaderMap,
    ) -> Result<reqwest::RequestBuilder, FetchError> {
        Ok(builder)
    }

    /// Called once the response body has been read, for any status.
    fn on_response(&self, _ctx: &HttpRequestContext, _response: &HttpTransportResponse) {}

    /// Called when no response could be obtained.
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &FetchError) {}
}

/// A simple logging interceptor backed by `tracing` (no bodies, no credentials).
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        builder: reqwest::RequestBuilder,
        _headers: &HeaderMap,
    ) -> Result<reqwest::RequestBuilder, FetchError> {
        tracing::debug!(target: "nudge_client::http", request_id=%ctx.request_id, method=%ctx.method, target_url=%ctx.target, "sending request");
        Ok(builder)
    }

    fn on_response(&self, ctx: &HttpRequestContext, response: &HttpTransportResponse) {
        tracing::debug!(target: "nudge_client::http", request_id=%ctx.request_id, status=%response.status, bytes=response.body.len(), "response received");
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &FetchError) {
        tracing::debug!(target: "nudge_client::http", request_id=%ctx.request_id, method=%ctx.method, target_url=%ctx.target, err=%error, "request error");
    }
}
