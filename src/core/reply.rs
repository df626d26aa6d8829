use std::fmt;

use crate::api::{ChatReplyBody, ReplyStatus};

/// Appended to a partial answer that hit the output-token ceiling.
pub const TRUNCATION_NOTICE: &str =
    "\n\n---\n_Response truncated: the model reached its output limit. Ask me to continue for the rest._";

/// Returned when generation stopped at the length limit before producing text.
pub const TRUNCATED_EMPTY_MESSAGE: &str = "The model ran out of room before it could answer. Try a shorter or more specific prompt, or switch to a model with a larger output limit.";

/// Returned when the provider produced no usable text.
pub const EMPTY_REPLY_MESSAGE: &str = "Sorry, I couldn't come up with a response to that. Try rephrasing your message or switching to a different model.";

/// Why a successful reply carries synthesized or partial text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedReason {
    /// Partial text kept, truncation notice appended.
    Truncated,
    /// Length limit hit with no text at all.
    TruncatedEmpty,
    /// Provider finished normally but returned no text.
    Empty,
    /// Provider reported a safety/recitation/other stop and no text.
    Blocked(String),
}

impl DegradedReason {
    pub fn as_str(&self) -> &str {
        match self {
            DegradedReason::Truncated => "truncated",
            DegradedReason::TruncatedEmpty => "truncated_empty",
            DegradedReason::Empty => "empty",
            DegradedReason::Blocked(_) => "blocked",
        }
    }

    /// Wire form; blocked replies keep the provider's reason.
    pub fn wire(&self) -> String {
        match self {
            DegradedReason::Blocked(reason) => format!("blocked:{}", reason.to_ascii_lowercase()),
            other => other.as_str().to_string(),
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "truncated" => Some(DegradedReason::Truncated),
            "truncated_empty" => Some(DegradedReason::TruncatedEmpty),
            "empty" => Some(DegradedReason::Empty),
            other => other
                .strip_prefix("blocked")
                .map(|rest| DegradedReason::Blocked(rest.trim_start_matches(':').to_ascii_uppercase())),
        }
    }
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedReason::Truncated => write!(f, "truncated at the output limit"),
            DegradedReason::TruncatedEmpty => write!(f, "output limit reached before any text"),
            DegradedReason::Empty => write!(f, "empty reply"),
            DegradedReason::Blocked(reason) => write!(f, "stopped by provider ({reason})"),
        }
    }
}

/// Successful outcome of a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Answer {
        text: String,
        model: String,
    },
    Degraded {
        text: String,
        model: String,
        reason: DegradedReason,
    },
}

impl ChatReply {
    pub fn answer(text: impl Into<String>, model: impl Into<String>) -> Self {
        ChatReply::Answer {
            text: text.into(),
            model: model.into(),
        }
    }

    pub fn degraded(text: impl Into<String>, model: impl Into<String>, reason: DegradedReason) -> Self {
        ChatReply::Degraded {
            text: text.into(),
            model: model.into(),
            reason,
        }
    }

    /// Partial text plus the truncation notice, or guidance when nothing was
    /// produced.
    pub fn truncated(partial: &str, model: impl Into<String>) -> Self {
        if partial.trim().is_empty() {
            Self::degraded(TRUNCATED_EMPTY_MESSAGE, model, DegradedReason::TruncatedEmpty)
        } else {
            Self::degraded(
                format!("{partial}{TRUNCATION_NOTICE}"),
                model,
                DegradedReason::Truncated,
            )
        }
    }

    /// Apology reply for missing text; `finish_reason` other than a normal
    /// stop is kept as the block reason.
    pub fn empty(model: impl Into<String>, finish_reason: Option<&str>) -> Self {
        let reason = match finish_reason {
            Some(reason) if !reason.eq_ignore_ascii_case("STOP") => {
                DegradedReason::Blocked(reason.to_string())
            }
            _ => DegradedReason::Empty,
        };
        Self::degraded(EMPTY_REPLY_MESSAGE, model, reason)
    }

    pub fn text(&self) -> &str {
        match self {
            ChatReply::Answer { text, .. } | ChatReply::Degraded { text, .. } => text,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ChatReply::Answer { model, .. } | ChatReply::Degraded { model, .. } => model,
        }
    }

    pub fn degraded_reason(&self) -> Option<&DegradedReason> {
        match self {
            ChatReply::Answer { .. } => None,
            ChatReply::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ChatReply::Degraded { .. })
    }

    /// Rebuilds a reply from the server's wire envelope.
    pub fn from_body(body: ChatReplyBody) -> Self {
        let reason = match body.status {
            ReplyStatus::Ok => None,
            ReplyStatus::Degraded => Some(
                body.reason
                    .as_deref()
                    .and_then(DegradedReason::from_wire)
                    .unwrap_or(DegradedReason::Empty),
            ),
        };
        match reason {
            None => ChatReply::answer(body.reply, body.model),
            Some(reason) => ChatReply::degraded(body.reply, body.model, reason),
        }
    }
}

impl From<ChatReply> for ChatReplyBody {
    fn from(reply: ChatReply) -> Self {
        match reply {
            ChatReply::Answer { text, model } => ChatReplyBody {
                reply: text,
                model,
                status: ReplyStatus::Ok,
                reason: None,
            },
            ChatReply::Degraded {
                text,
                model,
                reason,
            } => ChatReplyBody {
                reply: text,
                model,
                status: ReplyStatus::Degraded,
                reason: Some(reason.wire()),
            },
        }
    }
}
