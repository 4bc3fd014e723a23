//! Chat message records and wire payloads.

use super::annotation::annotate_failure;
use crate::defaults;
use crate::enrichment::EnrichmentSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable message identity. Fresh ids are UUIDv7, so they sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The user.
    Local,
    /// The assistant.
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Settled,
    Failed,
}

impl MessageStatus {
    /// `pending -> settled | failed`, `failed -> pending`; `settled` is terminal.
    pub const fn can_transition_to(self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Settled)
                | (Self::Pending, Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: MessageId,
    pub origin: Origin,
    /// Canonical content, never carrying a status annotation.
    pub text: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn local(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            origin: Origin::Local,
            text: text.into(),
            status: MessageStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn remote(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            origin: Origin::Remote,
            text: text.into(),
            status: MessageStatus::Settled,
            created_at: Utc::now(),
        }
    }

    /// Text as rendered, with `suffix` appended once when the send failed.
    pub fn display_text_with(&self, suffix: &str) -> String {
        match self.status {
            MessageStatus::Failed => annotate_failure(&self.text, suffix),
            _ => self.text.clone(),
        }
    }

    pub fn display_text(&self) -> String {
        self.display_text_with(defaults::messages::FAILURE_SUFFIX)
    }
}

/// POST body sent for each chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequestBody<'a> {
    pub message: &'a str,
    pub context: ChatContext<'a>,
}

/// `{deviceInfo, location, ...caller-supplied}`
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext<'a> {
    #[serde(flatten)]
    pub enrichment: &'a EnrichmentSnapshot,
    #[serde(flatten)]
    pub extra: &'a serde_json::Map<String, serde_json::Value>,
}

/// Successful reply from the nudge endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeResponse {
    pub nudge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<serde_json::Value>>,
}
