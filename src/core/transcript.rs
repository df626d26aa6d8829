//! Transcript validation and normalization.
//!
//! Providers that require a user-first conversation reject histories that
//! open with an assistant turn, so normalization always starts at the first
//! user message. Order is never changed; entries are only dropped from the
//! front (and, on capped paths, from the oldest end).

use serde_json::Value;

use crate::api::IncomingMessage;
use crate::core::error::{RelayError, EMPTY_TRANSCRIPT_MESSAGE, LAST_MESSAGE_MESSAGE};
use crate::core::message::Message;

/// Turns replayed to the primary provider before older context is dropped.
pub const PRIMARY_HISTORY_LIMIT: usize = 10;

/// A transcript that passed the router's preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Normalized turns preceding the newest user message.
    pub history: Vec<Message>,
    /// Newest user message, trimmed.
    pub latest: String,
}

impl Transcript {
    /// History followed by the newest user turn.
    pub fn full(&self) -> Vec<Message> {
        let mut messages = self.history.clone();
        messages.push(Message::user(self.latest.clone()));
        messages
    }

    /// At most the `limit` most recent history turns, still starting at a
    /// user turn.
    pub fn recent_history(&self, limit: usize) -> &[Message] {
        cap_recent(&self.history, limit)
    }
}

/// Drops entries missing a role or content, then discards everything before
/// the first user message. No user message yields an empty history.
pub fn normalize(entries: &[IncomingMessage]) -> Vec<Message> {
    let safe: Vec<Message> = entries.iter().filter_map(IncomingMessage::to_message).collect();
    match safe.iter().position(Message::is_user) {
        Some(first_user) => safe[first_user..].to_vec(),
        None => Vec::new(),
    }
}

/// Keeps the newest `limit` entries, then drops any that precede the first
/// user turn in that window.
pub fn cap_recent(messages: &[Message], limit: usize) -> &[Message] {
    let window = &messages[messages.len().saturating_sub(limit)..];
    match window.iter().position(Message::is_user) {
        Some(first_user) => &window[first_user..],
        None => &[],
    }
}

/// Applies the router preconditions to a raw `messages` value.
pub fn validate(messages: &Value) -> Result<Transcript, RelayError> {
    let raw = match messages.as_array() {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(RelayError::invalid_input(EMPTY_TRANSCRIPT_MESSAGE)),
    };

    // Entries that are not objects behave like entries with neither field.
    let entries: Vec<IncomingMessage> = raw
        .iter()
        .map(|value| serde_json::from_value(value.clone()).unwrap_or_default())
        .collect();

    let Some((last, earlier)) = entries.split_last() else {
        return Err(RelayError::invalid_input(EMPTY_TRANSCRIPT_MESSAGE));
    };

    let latest = match (last.role.as_deref(), last.content.as_deref()) {
        (Some("user"), Some(content)) if !content.trim().is_empty() => content.trim().to_string(),
        _ => return Err(RelayError::invalid_input(LAST_MESSAGE_MESSAGE)),
    };

    Ok(Transcript {
        history: normalize(earlier),
        latest,
    })
}
