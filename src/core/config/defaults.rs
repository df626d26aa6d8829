use std::time::Duration;

use crate::core::config::data::{Config, ProviderEndpoint};
use crate::core::models::ProviderKind;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_ALTERNATE_VENDOR_TOKENS: &[&str] = &["qwen"];

impl Config {
    pub fn host(&self) -> &str {
        self.server.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn default_model(&self) -> &str {
        self.default_model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn alternate_vendor_tokens(&self) -> Vec<String> {
        match &self.alternate_vendor_tokens {
            Some(tokens) => tokens.clone(),
            None => DEFAULT_ALTERNATE_VENDOR_TOKENS
                .iter()
                .map(|token| token.to_string())
                .collect(),
        }
    }

    pub fn provider_endpoint(&self, provider: ProviderKind) -> &ProviderEndpoint {
        match provider {
            ProviderKind::Gemini => &self.providers.gemini,
            ProviderKind::OpenRouter => &self.providers.openrouter,
        }
    }

    pub fn provider_base_url(&self, provider: ProviderKind) -> &str {
        let fallback = match provider {
            ProviderKind::Gemini => DEFAULT_GEMINI_BASE_URL,
            ProviderKind::OpenRouter => DEFAULT_OPENROUTER_BASE_URL,
        };
        self.provider_endpoint(provider)
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(fallback)
    }

    /// Blank keys count as missing.
    pub fn provider_api_key(&self, provider: ProviderKind) -> Option<&str> {
        self.provider_endpoint(provider)
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}
