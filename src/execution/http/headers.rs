//! HTTP Headers Utility
//!
//! Builds validated `HeaderMap`s from the plain string maps carried by
//! request configuration.

use crate::error::FetchError;
use reqwest::header::{
    AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use std::collections::HashMap;

/// HTTP header builder for outgoing requests
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Add Bearer token authorization
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self, FetchError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            FetchError::ConfigurationError(format!("Invalid bearer token format: {e}"))
        })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, FetchError> {
        self.headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| FetchError::ConfigurationError(format!("Invalid user agent: {e}")))?,
        );
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, FetchError> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Add multiple headers; later entries override earlier ones with the same name.
    pub fn with_custom_headers(
        mut self,
        custom_headers: &HashMap<String, String>,
    ) -> Result<Self, FetchError> {
        for (key, value) in custom_headers {
            let (name, value) = parse_header(key, value)?;
            self.headers.insert(name, value);
        }
        Ok(self)
    }

    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

impl Default for HttpHeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), FetchError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        FetchError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| {
        FetchError::ConfigurationError(format!("Invalid header value for '{name}': {e}"))
    })?;
    Ok((header_name, header_value))
}

/// Convert a `HeaderMap` to `HashMap<String, String>`, dropping non-UTF-8 values.
pub fn headermap_to_hashmap(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v_str| (k.as_str().to_string(), v_str.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_builder() {
        let headers = HttpHeaderBuilder::new()
            .with_bearer_auth("test-token")
            .unwrap()
            .with_json_content_type()
            .with_user_agent("test-agent")
            .unwrap()
            .build();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer test-token");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "test-agent");
    }

    #[test]
    fn custom_headers_override_earlier_values() {
        let mut extra = HashMap::new();
        extra.insert("X-Client".to_string(), "mobile".to_string());

        let headers = HttpHeaderBuilder::new()
            .with_header("x-client", "web")
            .unwrap()
            .with_custom_headers(&extra)
            .unwrap()
            .build();
        assert_eq!(headers.get("x-client").unwrap(), "mobile");
    }

    #[test]
    fn invalid_header_name_is_a_configuration_error() {
        let err = HttpHeaderBuilder::new()
            .with_header("bad header", "v")
            .err()
            .unwrap();
        assert!(matches!(err, FetchError::ConfigurationError(_)));
    }
}
