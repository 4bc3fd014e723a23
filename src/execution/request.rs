//! Request configuration and per-call overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP method issued by an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instance-level request configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Absolute URL or path relative to the transport's base URL.
    pub target: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl RequestConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Apply per-call overrides on top of this configuration.
    ///
    /// Scalar fields are replaced when set; headers are merged with the
    /// override winning on conflicts.
    pub fn merged(&self, overrides: RequestOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(target) = overrides.target {
            merged.target = target;
        }
        if let Some(method) = overrides.method {
            merged.method = method;
        }
        merged.headers.extend(overrides.headers);
        if overrides.body.is_some() {
            merged.body = overrides.body;
        }
        merged
    }
}

/// Per-call overrides merged on top of a [`RequestConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOverrides {
    pub target: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl RequestOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}
