//! Conversation state and the single in-flight request.
//!
//! The controller is driven by [`ControllerAction`]s and answers with
//! [`ControllerCommand`]s for the caller to execute, so it never performs I/O
//! itself. Every dispatched request carries an id; results for any id other
//! than the one currently in flight are dropped, which is what keeps a late
//! answer from landing after an interrupt.

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::ClientError;
use crate::api::HealthResponse;
use crate::core::message::Message;
use crate::core::models::ModelRegistry;
use crate::core::reply::{ChatReply, DegradedReason};

pub const WELCOME_MESSAGE: &str = "Nero is active. Let’s get to work.";
pub const INTERRUPTED_NOTICE: &str = "Response interrupted.";
pub const EMPTY_REPLY_BANNER: &str = "The assistant returned an empty response. Try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Checking,
    Connected { model_label: String },
    Offline,
    Failed { model_label: String },
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Checking => write!(f, "Checking connection…"),
            ConnectionStatus::Connected { model_label } => {
                write!(f, "Connected · Model: {model_label}")
            }
            ConnectionStatus::Offline => write!(f, "Offline"),
            ConnectionStatus::Failed { model_label } => {
                write!(f, "Failed to connect · Model: {model_label}")
            }
        }
    }
}

/// A transcript entry plus how the reply was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub message: Message,
    pub degraded: Option<DegradedReason>,
}

impl TranscriptEntry {
    fn plain(message: Message) -> Self {
        Self {
            message,
            degraded: None,
        }
    }
}

#[derive(Debug)]
pub enum ControllerAction {
    Submit { text: String },
    Interrupt,
    ReplyReceived {
        request_id: u64,
        result: Result<ChatReply, ClientError>,
    },
    HealthChecked { result: Result<HealthResponse, ClientError> },
    SelectModel { model: String },
    SelectBehaviour { behaviour: String },
    ClearTranscript,
}

/// A chat call the caller must perform and report back with
/// [`ControllerAction::ReplyReceived`].
#[derive(Debug, Clone)]
pub struct ChatDispatch {
    pub request_id: u64,
    pub messages: Vec<Message>,
    pub behaviour: String,
    pub model: String,
    pub cancel_token: CancellationToken,
}

#[derive(Debug, Clone)]
pub enum ControllerCommand {
    SendChat(ChatDispatch),
}

struct InFlight {
    request_id: u64,
    cancel_token: CancellationToken,
}

pub struct ConversationController {
    entries: Vec<TranscriptEntry>,
    behaviour: String,
    model: String,
    status: ConnectionStatus,
    banner: Option<String>,
    in_flight: Option<InFlight>,
    last_request_id: u64,
    models: ModelRegistry,
}

impl ConversationController {
    pub fn new(behaviour: impl Into<String>, model: impl Into<String>, models: ModelRegistry) -> Self {
        Self {
            entries: vec![TranscriptEntry::plain(Message::assistant(WELCOME_MESSAGE))],
            behaviour: behaviour.into(),
            model: model.into(),
            status: ConnectionStatus::Checking,
            banner: None,
            in_flight: None,
            last_request_id: 0,
            models,
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn messages(&self) -> Vec<Message> {
        self.entries.iter().map(|entry| entry.message.clone()).collect()
    }

    pub fn behaviour(&self) -> &str {
        &self.behaviour
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Cancellation handle for the in-flight request, if any.
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        self.in_flight.as_ref().map(|flight| flight.cancel_token.clone())
    }

    pub fn is_current_request(&self, request_id: u64) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|flight| flight.request_id == request_id)
    }

    fn model_label(&self, id: &str) -> String {
        self.models.label(id).to_string()
    }

    fn start_request(&mut self) -> (CancellationToken, u64) {
        self.last_request_id += 1;
        let token = CancellationToken::new();
        self.in_flight = Some(InFlight {
            request_id: self.last_request_id,
            cancel_token: token.clone(),
        });
        (token, self.last_request_id)
    }

    fn reset_transcript(&mut self) {
        self.cancel_in_flight();
        self.entries = vec![TranscriptEntry::plain(Message::assistant(WELCOME_MESSAGE))];
        self.banner = None;
    }

    fn cancel_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(flight) => {
                flight.cancel_token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn apply_actions(
        &mut self,
        actions: impl IntoIterator<Item = ControllerAction>,
    ) -> Vec<ControllerCommand> {
        actions
            .into_iter()
            .filter_map(|action| self.apply_action(action))
            .collect()
    }

    pub fn apply_action(&mut self, action: ControllerAction) -> Option<ControllerCommand> {
        match action {
            ControllerAction::Submit { text } => self.submit(text),
            ControllerAction::Interrupt => {
                if self.cancel_in_flight() {
                    debug!(request_id = self.last_request_id, "Interrupted chat request");
                    self.banner = Some(INTERRUPTED_NOTICE.to_string());
                }
                None
            }
            ControllerAction::ReplyReceived { request_id, result } => {
                self.reconcile(request_id, result);
                None
            }
            ControllerAction::HealthChecked { result } => {
                self.status = match result {
                    Ok(health) => ConnectionStatus::Connected {
                        model_label: self.model_label(&health.model),
                    },
                    Err(_) => ConnectionStatus::Offline,
                };
                None
            }
            ControllerAction::SelectModel { model } => {
                let model = model.trim();
                if !model.is_empty() {
                    self.model = model.to_string();
                }
                None
            }
            ControllerAction::SelectBehaviour { behaviour } => {
                self.behaviour = behaviour.trim().to_string();
                self.reset_transcript();
                None
            }
            ControllerAction::ClearTranscript => {
                self.reset_transcript();
                None
            }
        }
    }

    fn submit(&mut self, text: String) -> Option<ControllerCommand> {
        let text = text.trim();
        if text.is_empty() || self.is_pending() {
            return None;
        }

        self.entries
            .push(TranscriptEntry::plain(Message::user(text.to_string())));
        self.banner = None;
        let (cancel_token, request_id) = self.start_request();
        debug!(request_id, model = %self.model, "Dispatching chat request");

        Some(ControllerCommand::SendChat(ChatDispatch {
            request_id,
            messages: self.messages(),
            behaviour: self.behaviour.clone(),
            model: self.model.clone(),
            cancel_token,
        }))
    }

    fn reconcile(&mut self, request_id: u64, result: Result<ChatReply, ClientError>) {
        if !self.is_current_request(request_id) {
            debug!(request_id, "Dropping stale chat result");
            return;
        }
        self.in_flight = None;

        match result {
            Ok(reply) => {
                self.status = ConnectionStatus::Connected {
                    model_label: self.model_label(reply.model()),
                };
                if reply.text().trim().is_empty() {
                    self.banner = Some(EMPTY_REPLY_BANNER.to_string());
                    return;
                }
                let degraded = reply.degraded_reason().cloned();
                self.entries.push(TranscriptEntry {
                    message: Message::assistant(reply.text().to_string()),
                    degraded,
                });
            }
            Err(err) => {
                if err.is_connection_failure() {
                    self.status = ConnectionStatus::Failed {
                        model_label: self.model_label(&self.model),
                    };
                }
                self.banner = Some(err.to_string());
            }
        }
    }
}
