use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::models::ModelSpec;
use crate::core::preset::BehaviourPreset;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Endpoint and credential for one upstream provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: ProviderEndpoint,
    #[serde(default)]
    pub openrouter: ProviderEndpoint,
}

/// Harm-category threshold sent with every Gemini request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SafetyThreshold {
    /// Nothing is blocked.
    #[default]
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
    /// Send no safety settings and let the provider apply its own defaults.
    ProviderDefault,
}

impl SafetyThreshold {
    pub fn as_api_str(self) -> Option<&'static str> {
        match self {
            SafetyThreshold::BlockNone => Some("BLOCK_NONE"),
            SafetyThreshold::BlockOnlyHigh => Some("BLOCK_ONLY_HIGH"),
            SafetyThreshold::BlockMediumAndAbove => Some("BLOCK_MEDIUM_AND_ABOVE"),
            SafetyThreshold::BlockLowAndAbove => Some("BLOCK_LOW_AND_ABOVE"),
            SafetyThreshold::ProviderDefault => None,
        }
    }

    pub fn is_permissive(self) -> bool {
        self == SafetyThreshold::BlockNone
    }

    pub fn as_config_str(self) -> &'static str {
        match self {
            SafetyThreshold::BlockNone => "block_none",
            SafetyThreshold::BlockOnlyHigh => "block_only_high",
            SafetyThreshold::BlockMediumAndAbove => "block_medium_and_above",
            SafetyThreshold::BlockLowAndAbove => "block_low_and_above",
            SafetyThreshold::ProviderDefault => "provider_default",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "block_none" => Some(SafetyThreshold::BlockNone),
            "block_only_high" => Some(SafetyThreshold::BlockOnlyHigh),
            "block_medium_and_above" => Some(SafetyThreshold::BlockMediumAndAbove),
            "block_low_and_above" => Some(SafetyThreshold::BlockLowAndAbove),
            "provider_default" => Some(SafetyThreshold::ProviderDefault),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SafetyConfig {
    #[serde(default)]
    pub threshold: SafetyThreshold,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model used when a request names none (e.g., "gemini-2.5-flash")
    pub default_model: Option<String>,
    /// Behaviour preset used for unknown or missing names
    pub default_behaviour: Option<String>,
    /// Upstream request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Substrings that send unregistered model ids to OpenRouter
    pub alternate_vendor_tokens: Option<Vec<String>>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    /// Extra or overriding entries for the model registry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelSpec>,
    /// Extra or overriding behaviour presets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<BehaviourPreset>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
