//! Request routing: validation, preset and model resolution, adapter dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ChatRequestBody;
use crate::core::adapters::{
    build_http_client, GeminiAdapter, OpenRouterAdapter, ProviderAdapter, ProviderRequest,
};
use crate::core::config::{Config, SafetyThreshold};
use crate::core::error::RelayError;
use crate::core::models::{ModelRegistry, ProviderKind, RouteSource};
use crate::core::preset::PresetCatalog;
use crate::core::reply::ChatReply;
use crate::core::transcript;

pub struct ChatRouter {
    registry: ModelRegistry,
    presets: PresetCatalog,
    default_model: String,
    safety: SafetyThreshold,
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ChatRouter {
    pub fn new(registry: ModelRegistry, presets: PresetCatalog, default_model: impl Into<String>) -> Self {
        Self {
            registry,
            presets,
            default_model: default_model.into(),
            safety: SafetyThreshold::default(),
            adapters: HashMap::new(),
        }
    }

    pub fn with_safety(mut self, safety: SafetyThreshold) -> Self {
        self.safety = safety;
        self
    }

    /// Registers `adapter` for the provider it reports; replaces any previous one.
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    /// Router wired to the real upstreams described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config.request_timeout())?;
        let registry = ModelRegistry::new(&config.models, &config.alternate_vendor_tokens());
        let presets = PresetCatalog::new(&config.presets, config.default_behaviour.as_deref());

        Ok(Self::new(registry, presets, config.default_model())
            .with_safety(config.safety.threshold)
            .with_adapter(Arc::new(GeminiAdapter::from_config(client.clone(), config)))
            .with_adapter(Arc::new(OpenRouterAdapter::from_config(client, config))))
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    /// The requested model id, or the default when none (or a blank one) was given.
    pub fn effective_model<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(&self.default_model)
    }

    pub async fn route(&self, body: &ChatRequestBody) -> Result<ChatReply, RelayError> {
        let transcript = transcript::validate(&body.messages)?;
        let model_id = self.effective_model(body.model.as_deref());
        let resolved = self.registry.resolve(model_id);
        let preset = self.presets.resolve(body.behaviour.as_deref());
        let provider = resolved.spec.provider;

        debug!(
            model = %model_id,
            provider = %provider,
            registry_hit = resolved.source == RouteSource::Registry,
            behaviour = %preset.id,
            history = transcript.history.len(),
            "Routing chat request"
        );

        let adapter = self.adapters.get(&provider).ok_or_else(|| {
            warn!(provider = %provider, "No adapter registered for provider");
            RelayError::upstream(provider, None, "provider adapter not configured")
        })?;

        let request = ProviderRequest {
            model: &resolved.spec,
            preset,
            transcript: &transcript,
        };
        let reply = adapter.complete(&request).await?;

        let safety = match provider {
            ProviderKind::Gemini => self.safety.as_config_str(),
            ProviderKind::OpenRouter => "n/a",
        };
        match reply.degraded_reason() {
            Some(reason) => info!(
                model = %model_id,
                provider = %provider,
                behaviour = %preset.id,
                safety,
                reason = %reason.wire(),
                "Chat reply degraded"
            ),
            None => info!(
                model = %model_id,
                provider = %provider,
                behaviour = %preset.id,
                safety,
                chars = reply.text().len(),
                "Chat reply delivered"
            ),
        }

        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::core::preset::SamplingConfig;

    /// What a fake adapter saw for one call.
    #[derive(Debug, Clone)]
    pub struct SeenRequest {
        pub model: String,
        pub behaviour: String,
        pub sampling: SamplingConfig,
        pub history_len: usize,
        pub latest: String,
    }

    /// Adapter double that records calls and returns a canned result.
    pub struct FakeAdapter {
        kind: ProviderKind,
        result: Result<ChatReply, RelayError>,
        hits: AtomicUsize,
        seen: Mutex<Vec<SeenRequest>>,
    }

    impl FakeAdapter {
        pub fn new(kind: ProviderKind, result: Result<ChatReply, RelayError>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                result,
                hits: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        pub fn answering(kind: ProviderKind, text: &str) -> Arc<Self> {
            Self::new(kind, Ok(ChatReply::answer(text, "fake")))
        }

        pub fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        pub fn last_seen(&self) -> Option<SeenRequest> {
            self.seen.lock().expect("seen lock").last().cloned()
        }
    }

    #[async_trait::async_trait]
    impl ProviderAdapter for FakeAdapter {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn complete(&self, request: &ProviderRequest<'_>) -> Result<ChatReply, RelayError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().expect("seen lock").push(SeenRequest {
                model: request.model.id.clone(),
                behaviour: request.preset.id.clone(),
                sampling: request.sampling(),
                history_len: request.transcript.history.len(),
                latest: request.transcript.latest.clone(),
            });
            match &self.result {
                Ok(ChatReply::Answer { text, .. }) => {
                    Ok(ChatReply::answer(text.clone(), request.model.id.clone()))
                }
                Ok(ChatReply::Degraded { text, reason, .. }) => Ok(ChatReply::degraded(
                    text.clone(),
                    request.model.id.clone(),
                    reason.clone(),
                )),
                Err(err) => Err(err.clone()),
            }
        }
    }

    pub fn router_with(gemini: Arc<FakeAdapter>, openrouter: Arc<FakeAdapter>) -> ChatRouter {
        ChatRouter::new(
            ModelRegistry::new(&[], &["qwen".to_string()]),
            PresetCatalog::builtin(),
            "gemini-2.5-flash",
        )
        .with_adapter(gemini)
        .with_adapter(openrouter)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::core::error::LAST_MESSAGE_MESSAGE;
    use serde_json::json;

    fn body(messages: serde_json::Value, behaviour: Option<&str>, model: Option<&str>) -> ChatRequestBody {
        ChatRequestBody {
            messages,
            behaviour: behaviour.map(str::to_string),
            model: model.map(str::to_string),
        }
    }

    fn fakes() -> (Arc<FakeAdapter>, Arc<FakeAdapter>) {
        (
            FakeAdapter::answering(ProviderKind::Gemini, "from gemini"),
            FakeAdapter::answering(ProviderKind::OpenRouter, "from openrouter"),
        )
    }

    #[tokio::test]
    async fn slash_model_goes_to_alternate_adapter() {
        let (gemini, openrouter) = fakes();
        let router = router_with(gemini.clone(), openrouter.clone());

        let reply = router
            .route(&body(
                json!([{"role": "user", "content": "hi"}]),
                None,
                Some("mistralai/mistral-7b-instruct:free"),
            ))
            .await
            .expect("reply");

        assert_eq!(reply.text(), "from openrouter");
        assert_eq!(reply.model(), "mistralai/mistral-7b-instruct:free");
        assert_eq!(openrouter.hits(), 1);
        assert_eq!(gemini.hits(), 0);
    }

    #[tokio::test]
    async fn missing_model_uses_default_primary() {
        let (gemini, openrouter) = fakes();
        let router = router_with(gemini.clone(), openrouter.clone());

        let reply = router
            .route(&body(json!([{"role": "user", "content": "  hi  "}]), None, Some(" ")))
            .await
            .expect("reply");

        assert_eq!(reply.model(), "gemini-2.5-flash");
        let seen = gemini.last_seen().expect("call recorded");
        assert_eq!(seen.latest, "hi");
        assert_eq!(seen.behaviour, "explainer");
        assert_eq!(openrouter.hits(), 0);
    }

    #[tokio::test]
    async fn unknown_behaviour_matches_missing_behaviour() {
        let (gemini, openrouter) = fakes();
        let router = router_with(gemini.clone(), openrouter);
        let messages = json!([{"role": "user", "content": "hi"}]);

        router
            .route(&body(messages.clone(), Some("pirate"), None))
            .await
            .expect("reply");
        let unknown = gemini.last_seen().expect("call");
        router.route(&body(messages, None, None)).await.expect("reply");
        let missing = gemini.last_seen().expect("call");

        assert_eq!(unknown.behaviour, missing.behaviour);
        assert_eq!(unknown.sampling, missing.sampling);
    }

    #[tokio::test]
    async fn pro_model_floor_raises_output_ceiling() {
        let (gemini, openrouter) = fakes();
        let router = router_with(gemini.clone(), openrouter);

        router
            .route(&body(
                json!([{"role": "user", "content": "hi"}]),
                Some("brief"),
                Some("gemini-2.5-pro"),
            ))
            .await
            .expect("reply");

        let seen = gemini.last_seen().expect("call");
        assert_eq!(seen.sampling.max_output_tokens, 8192);
        assert_eq!(seen.sampling.temperature, 0.2);
    }

    #[tokio::test]
    async fn invalid_transcripts_never_reach_an_adapter() {
        let (gemini, openrouter) = fakes();
        let router = router_with(gemini.clone(), openrouter.clone());

        let err = router
            .route(&body(
                json!([{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]),
                None,
                None,
            ))
            .await
            .expect_err("should fail");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), LAST_MESSAGE_MESSAGE);

        let err = router
            .route(&body(json!("not an array"), None, Some("qwen/qwen3-4b:free")))
            .await
            .expect_err("should fail");
        assert!(err.is_client_error());

        assert_eq!(gemini.hits() + openrouter.hits(), 0);
    }

    #[tokio::test]
    async fn adapter_errors_and_degraded_replies_pass_through() {
        let gemini = FakeAdapter::new(
            ProviderKind::Gemini,
            Err(RelayError::missing_credential(ProviderKind::Gemini)),
        );
        let openrouter = FakeAdapter::new(
            ProviderKind::OpenRouter,
            Ok(ChatReply::empty("fake", None)),
        );
        let router = router_with(gemini, openrouter);
        let messages = json!([{"role": "user", "content": "hi"}]);

        let err = router
            .route(&body(messages.clone(), None, None))
            .await
            .expect_err("should fail");
        assert_eq!(err.message(), "Missing GOOGLE_API_KEY");

        let reply = router
            .route(&body(messages, None, Some("qwen/qwen3-4b:free")))
            .await
            .expect("reply");
        assert!(reply.is_degraded());
        assert_eq!(reply.model(), "qwen/qwen3-4b:free");
    }

    #[tokio::test]
    async fn missing_adapter_is_an_upstream_failure() {
        let router = ChatRouter::new(
            ModelRegistry::new(&[], &[]),
            PresetCatalog::builtin(),
            "gemini-2.5-flash",
        );
        let err = router
            .route(&body(json!([{"role": "user", "content": "hi"}]), None, None))
            .await
            .expect_err("should fail");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn from_config_uses_configured_default_model() {
        let config = Config {
            default_model: Some("gemini-2.5-pro".to_string()),
            ..Default::default()
        };
        let router = ChatRouter::from_config(&config).expect("router");
        assert_eq!(router.default_model(), "gemini-2.5-pro");
        assert_eq!(router.effective_model(None), "gemini-2.5-pro");
        assert_eq!(router.effective_model(Some("qwen/qwen3-4b:free")), "qwen/qwen3-4b:free");
    }
}
