//! Upstream provider adapters.
//!
//! Each adapter turns a validated transcript plus a behaviour preset into one
//! provider call and reconciles the provider's answer into a [`ChatReply`].
//! Credentials are checked before any network traffic.

pub mod gemini;
pub mod openrouter;

use std::time::Duration;

use crate::core::error::RelayError;
use crate::core::models::{ModelSpec, ProviderKind};
use crate::core::preset::{BehaviourPreset, SamplingConfig};
use crate::core::reply::ChatReply;
use crate::core::transcript::Transcript;

pub use gemini::GeminiAdapter;
pub use openrouter::OpenRouterAdapter;

const CONNECT_TIMEOUT_SECONDS: u64 = 10;
const POOL_IDLE_TIMEOUT_SECONDS: u64 = 90;

/// Everything an adapter needs for one call.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    pub model: &'a ModelSpec,
    pub preset: &'a BehaviourPreset,
    pub transcript: &'a Transcript,
}

impl ProviderRequest<'_> {
    /// Preset sampling with the model's output floor applied.
    pub fn sampling(&self) -> SamplingConfig {
        self.preset
            .sampling
            .with_output_floor(self.model.output_token_floor)
    }
}

#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn complete(&self, request: &ProviderRequest<'_>) -> Result<ChatReply, RelayError>;
}

/// Shared upstream client; `timeout` bounds each whole request.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECONDS))
        .build()
}

/// Credential lookup shared by the adapters; blank keys count as missing.
fn require_api_key(api_key: Option<&str>, provider: ProviderKind) -> Result<&str, RelayError> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| RelayError::missing_credential(provider))
}

/// Reads a non-success response into an upstream error.
async fn upstream_status_error(provider: ProviderKind, response: reqwest::Response) -> RelayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RelayError::upstream(
        provider,
        Some(status),
        crate::utils::api_error::summarize_error_body(&body),
    )
}
