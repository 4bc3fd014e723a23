//! Chat ledger configuration.

use crate::defaults;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Target the ledger posts messages to.
    pub endpoint: String,
    /// How long a failure notice stays up.
    pub notice_ttl: Duration,
    /// Display-time annotation for failed messages.
    pub failure_suffix: String,
    /// Extra caller-supplied fields merged into every request's `context`.
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::chat::ENDPOINT.to_string(),
            notice_ttl: defaults::chat::NOTICE_TTL,
            failure_suffix: defaults::messages::FAILURE_SUFFIX.to_string(),
            context: serde_json::Map::new(),
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn with_failure_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.failure_suffix = suffix.into();
        self
    }

    /// Add a caller-supplied context field, e.g. the active lesson.
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}
