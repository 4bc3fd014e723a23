//! Default `reqwest`-backed transport.

use super::headers::HttpHeaderBuilder;
use super::interceptor::HttpInterceptor;
use super::transport::{HttpTransport, HttpTransportRequest, HttpTransportResponse};
use crate::defaults;
use crate::error::FetchError;
use crate::execution::request::HttpMethod;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Connection-level configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Prefix for relative targets, e.g. `https://app.example.com`.
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
    /// Headers sent with every request; request headers override them.
    pub headers: HashMap<String, String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(defaults::http::REQUEST_TIMEOUT),
            connect_timeout: Some(defaults::http::CONNECT_TIMEOUT),
            user_agent: defaults::http::USER_AGENT.to_string(),
            headers: HashMap::new(),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// [`HttpTransport`] over a shared `reqwest::Client`.
///
/// Attaches `Authorization: Bearer ...` automatically when a token is set.
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: HttpClientConfig,
    bearer_token: Option<SecretString>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .field("has_bearer_token", &self.bearer_token.is_some())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl ReqwestTransport {
    pub fn new(config: HttpClientConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            FetchError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing client (connection pool, proxy settings, ...).
    pub fn with_client(client: reqwest::Client, config: HttpClientConfig) -> Self {
        Self {
            client,
            config,
            bearer_token: None,
            interceptors: Vec::new(),
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Resolve a target against the configured base URL.
    pub fn resolve_url(&self, target: &str) -> Result<String, FetchError> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(target.to_string());
        }
        let base = self.config.base_url.as_deref().ok_or_else(|| {
            FetchError::ConfigurationError(format!(
                "Relative target '{target}' requires a base URL"
            ))
        })?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            target.trim_start_matches('/')
        ))
    }

    fn notify_error(&self, request: &HttpTransportRequest, error: &FetchError) {
        for it in &self.interceptors {
            it.on_error(&request.ctx, error);
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, FetchError> {
        let url = self.resolve_url(&request.target)?;

        let mut headers = HttpHeaderBuilder::new()
            .with_user_agent(&self.config.user_agent)?
            .with_custom_headers(&self.config.headers)?;
        if let Some(token) = &self.bearer_token {
            headers = headers.with_bearer_auth(token.expose_secret())?;
        }
        if request.body.is_some() {
            headers = headers.with_json_content_type();
        }
        let headers = headers.with_custom_headers(&request.headers)?.build();

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        }
        .headers(headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        for it in &self.interceptors {
            builder = it.on_before_send(&request.ctx, builder, &headers)?;
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let error = FetchError::from(e);
                self.notify_error(&request, &error);
                return Err(error);
            }
        };

        let status = resp.status().as_u16();
        let response_headers = super::headers::headermap_to_hashmap(resp.headers());
        let body = match resp.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                let error = FetchError::from(e);
                self.notify_error(&request, &error);
                return Err(error);
            }
        };

        let response = HttpTransportResponse {
            status,
            headers: response_headers,
            body,
        };
        for it in &self.interceptors {
            it.on_response(&request.ctx, &response);
        }
        Ok(response)
    }
}
