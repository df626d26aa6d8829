//! Wire payloads for the relay's own HTTP surface.
//!
//! Upstream provider payloads live in [`gemini`] and [`openrouter`].

pub mod gemini;
pub mod openrouter;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::message::{Message, TranscriptRole};

/// A transcript entry as submitted by a client. Both fields are optional so
/// that malformed entries can be filtered instead of failing the whole body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl IncomingMessage {
    /// Converts to a transcript message when both role and content are
    /// present and the role is one the relay understands.
    pub fn to_message(&self) -> Option<Message> {
        let role = TranscriptRole::try_from(self.role.as_deref()?).ok()?;
        let content = self.content.as_deref()?;
        if content.is_empty() {
            return None;
        }
        Some(Message::new(role, content))
    }
}

impl From<&Message> for IncomingMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: Some(message.role.as_str().to_string()),
            content: Some(message.content.clone()),
        }
    }
}

/// Body of `POST /api/chat`. `messages` is kept as raw JSON so the router can
/// reject non-array values with a 400 rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub messages: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behaviour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReplyBody {
    pub reply: String,
    pub model: String,
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
