//! Client side of the relay: an HTTP client for the relay endpoints and the
//! conversation controller that owns the request lifecycle.

pub mod controller;

use std::error::Error;
use std::fmt;

use crate::api::{ChatReplyBody, ChatRequestBody, ErrorBody, HealthResponse, IncomingMessage};
use crate::core::message::Message;
use crate::core::reply::ChatReply;
use crate::utils::url::construct_api_url;

/// Failures seen by the client when talking to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The relay answered with a non-success status.
    Server { status: u16, message: String },
    /// The relay could not be reached.
    Transport(String),
    /// The relay answered with a body the client could not read.
    Decode(String),
}

impl ClientError {
    /// Server-side (5xx) and transport failures mark the connection as failed.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            ClientError::Server { status, .. } => *status >= 500,
            ClientError::Transport(_) => true,
            ClientError::Decode(_) => false,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Server { message, .. } => write!(f, "{message}"),
            ClientError::Transport(message) => write!(f, "Could not reach the relay: {message}"),
            ClientError::Decode(message) => write!(f, "Unexpected response from the relay: {message}"),
        }
    }
}

impl Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends the whole transcript; the relay keeps no conversation state.
    pub async fn send_chat(
        &self,
        messages: &[Message],
        behaviour: &str,
        model: &str,
    ) -> Result<ChatReply, ClientError> {
        let body = ChatRequestBody {
            messages: serde_json::to_value(
                messages.iter().map(IncomingMessage::from).collect::<Vec<_>>(),
            )
            .map_err(|err| ClientError::Decode(err.to_string()))?,
            behaviour: Some(behaviour.to_string()),
            model: Some(model.to_string()),
        };

        let response = self
            .http
            .post(construct_api_url(&self.base_url, "api/chat"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("Something went wrong. Try again.")
                .to_string();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .ok()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or(fallback);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatReplyBody = response.json().await?;
        Ok(ChatReply::from_body(body))
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(construct_api_url(&self.base_url, "health"))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}
