use tracing::{debug, error};

use super::{require_api_key, upstream_status_error, ProviderAdapter, ProviderRequest};
use crate::api::gemini::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, SafetySetting,
};
use crate::core::config::{Config, SafetyThreshold};
use crate::core::error::RelayError;
use crate::core::message::{ROLE_USER, TranscriptRole};
use crate::core::models::ProviderKind;
use crate::core::reply::ChatReply;
use crate::core::transcript::PRIMARY_HISTORY_LIMIT;
use crate::utils::url::gemini_generate_url;

pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

const FINISH_STOP: &str = "STOP";
const FINISH_MAX_TOKENS: &str = "MAX_TOKENS";
const FINISH_UNSPECIFIED: &str = "FINISH_REASON_UNSPECIFIED";

pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    safety: SafetyThreshold,
}

impl GeminiAdapter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        safety: SafetyThreshold,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            safety,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config.provider_base_url(ProviderKind::Gemini),
            config.provider_api_key(ProviderKind::Gemini).map(str::to_string),
            config.safety.threshold,
        )
    }

    /// Few-shot exchanges, the capped history, then the newest user turn.
    pub fn build_request(&self, request: &ProviderRequest<'_>) -> GenerateContentRequest {
        let model_role = TranscriptRole::Assistant.to_gemini_role();
        let mut contents = Vec::new();
        for example in &request.preset.examples {
            contents.push(Content::text(Some(ROLE_USER), example.user.clone()));
            contents.push(Content::text(Some(model_role), example.assistant.clone()));
        }
        contents.extend(
            request
                .transcript
                .recent_history(PRIMARY_HISTORY_LIMIT)
                .iter()
                .map(|message| {
                    Content::text(Some(message.role.to_gemini_role()), message.content.clone())
                }),
        );
        contents.push(Content::text(
            Some(ROLE_USER),
            request.transcript.latest.clone(),
        ));

        let sampling = request.sampling();
        GenerateContentRequest {
            system_instruction: Content::text(None, request.preset.system_prompt.clone()),
            contents,
            generation_config: GenerationConfig {
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                max_output_tokens: sampling.max_output_tokens,
            },
            safety_settings: safety_settings(self.safety),
        }
    }
}

/// One setting per harm category; empty for the provider's own defaults.
pub fn safety_settings(threshold: SafetyThreshold) -> Vec<SafetySetting> {
    match threshold.as_api_str() {
        Some(level) => HARM_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: level.to_string(),
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Maps the first candidate's finish reason and text onto a reply. Any stop
/// other than a normal one or the length limit discards the candidate's text.
pub fn interpret_response(response: &GenerateContentResponse, model: &str) -> ChatReply {
    let block_reason = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref());

    let Some(candidate) = response.candidates.first() else {
        return ChatReply::empty(model, block_reason);
    };

    let finish_reason = candidate.finish_reason.as_deref();
    let text = candidate
        .content
        .as_ref()
        .map(Content::joined_text)
        .unwrap_or_default();

    match finish_reason {
        Some(FINISH_MAX_TOKENS) => return ChatReply::truncated(&text, model),
        None | Some(FINISH_STOP) | Some(FINISH_UNSPECIFIED) => {}
        Some(other) => return ChatReply::empty(model, Some(other)),
    }
    if !text.trim().is_empty() {
        return ChatReply::answer(text, model);
    }
    ChatReply::empty(model, finish_reason.or(block_reason))
}

#[async_trait::async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(&self, request: &ProviderRequest<'_>) -> Result<ChatReply, RelayError> {
        let api_key = require_api_key(self.api_key.as_deref(), ProviderKind::Gemini)?;
        let model = request.model.id.as_str();
        let body = self.build_request(request);
        debug!(
            model = %model,
            contents = body.contents.len(),
            max_output_tokens = body.generation_config.max_output_tokens,
            safety = self.safety.as_config_str(),
            "Calling Gemini generateContent"
        );

        let response = self
            .client
            .post(gemini_generate_url(&self.base_url, model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                error!(model = %model, error = %err, "Gemini request failed");
                RelayError::upstream(ProviderKind::Gemini, None, err.to_string())
            })?;

        if !response.status().is_success() {
            let err = upstream_status_error(ProviderKind::Gemini, response).await;
            error!(model = %model, error = %err, "Gemini returned an error status");
            return Err(err);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            error!(model = %model, error = %err, "Gemini response could not be decoded");
            RelayError::upstream(
                ProviderKind::Gemini,
                None,
                format!("invalid response body: {err}"),
            )
        })?;

        Ok(interpret_response(&parsed, model))
    }
}
