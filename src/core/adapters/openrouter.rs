use tracing::{debug, error};

use super::{require_api_key, upstream_status_error, ProviderAdapter, ProviderRequest};
use crate::api::openrouter::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::config::Config;
use crate::core::error::RelayError;
use crate::core::message::{ROLE_ASSISTANT, ROLE_USER};
use crate::core::models::ProviderKind;
use crate::core::reply::ChatReply;
use crate::utils::url::construct_api_url;

const ROLE_SYSTEM: &str = "system";

pub struct OpenRouterAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenRouterAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config.provider_base_url(ProviderKind::OpenRouter),
            config
                .provider_api_key(ProviderKind::OpenRouter)
                .map(str::to_string),
        )
    }

    /// System prompt, few-shot pairs, then the whole normalized transcript.
    pub fn build_request(&self, request: &ProviderRequest<'_>) -> ChatRequest {
        let mut messages = vec![ChatMessage::new(
            ROLE_SYSTEM,
            request.preset.system_prompt.clone(),
        )];
        for example in &request.preset.examples {
            messages.push(ChatMessage::new(ROLE_USER, example.user.clone()));
            messages.push(ChatMessage::new(ROLE_ASSISTANT, example.assistant.clone()));
        }
        messages.extend(
            request
                .transcript
                .full()
                .into_iter()
                .map(|message| ChatMessage::new(message.role.as_str(), message.content)),
        );

        let sampling = request.sampling();
        ChatRequest {
            model: request.model.id.clone(),
            messages,
            stream: false,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: sampling.max_output_tokens,
        }
    }
}

/// First choice's content, or the apology when it is missing or blank.
pub fn interpret_response(response: ChatResponse, model: &str) -> ChatReply {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty());

    match content {
        Some(text) => ChatReply::answer(text, model),
        None => ChatReply::empty(model, None),
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    async fn complete(&self, request: &ProviderRequest<'_>) -> Result<ChatReply, RelayError> {
        let api_key = require_api_key(self.api_key.as_deref(), ProviderKind::OpenRouter)?;
        let model = request.model.id.as_str();
        let body = self.build_request(request);
        debug!(
            model = %model,
            messages = body.messages.len(),
            max_tokens = body.max_tokens,
            "Calling OpenRouter chat completions"
        );

        let response = self
            .client
            .post(construct_api_url(&self.base_url, "chat/completions"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                error!(model = %model, error = %err, "OpenRouter request failed");
                RelayError::upstream(ProviderKind::OpenRouter, None, err.to_string())
            })?;

        if !response.status().is_success() {
            let err = upstream_status_error(ProviderKind::OpenRouter, response).await;
            error!(model = %model, error = %err, "OpenRouter returned an error status");
            return Err(err);
        }

        let parsed: ChatResponse = response.json().await.map_err(|err| {
            error!(model = %model, error = %err, "OpenRouter response could not be decoded");
            RelayError::upstream(
                ProviderKind::OpenRouter,
                None,
                format!("invalid response body: {err}"),
            )
        })?;

        Ok(interpret_response(parsed, model))
    }
}
