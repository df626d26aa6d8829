//! Model identifier → provider resolution.
//!
//! Identifiers are looked up in an explicit registry (built-in table plus
//! config-defined entries). Identifiers the registry does not know fall back
//! to a substring heuristic: a `/` or a configured vendor token routes to
//! OpenRouter, anything else to Gemini. The fallback can misroute future
//! identifiers, so every use of it is logged.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::core::builtin_models::load_builtin_models;

pub const PRO_OUTPUT_FLOOR: u32 = 8192;
pub const FLASH_OUTPUT_FLOOR: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenRouter,
}

impl ProviderKind {
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenRouter => "openrouter",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Google AI Studio",
            ProviderKind::OpenRouter => "OpenRouter",
        }
    }

    pub fn credential_env_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GOOGLE_API_KEY",
            ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.id())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSpec {
    pub id: String,
    pub display_name: String,
    pub provider: ProviderKind,
    /// Minimum `max_output_tokens` sent for this model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_token_floor: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Registry,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub spec: ModelSpec,
    pub source: RouteSource,
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
    alternate_vendor_tokens: Vec<String>,
}

impl ModelRegistry {
    /// Built-in models overlaid with `custom` entries (matched by id).
    pub fn new(custom: &[ModelSpec], alternate_vendor_tokens: &[String]) -> Self {
        let mut models = load_builtin_models();
        for spec in custom {
            match models.iter_mut().find(|existing| existing.id == spec.id) {
                Some(existing) => *existing = spec.clone(),
                None => models.push(spec.clone()),
            }
        }

        Self {
            models,
            alternate_vendor_tokens: alternate_vendor_tokens
                .iter()
                .map(|token| token.to_ascii_lowercase())
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    pub fn list(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn find(&self, id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|spec| spec.id == id)
    }

    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.find(id).map(|spec| spec.display_name.as_str()).unwrap_or(id)
    }

    pub fn resolve(&self, id: &str) -> ResolvedModel {
        if let Some(spec) = self.find(id) {
            return ResolvedModel {
                spec: spec.clone(),
                source: RouteSource::Registry,
            };
        }

        let provider = classify_by_pattern(id, &self.alternate_vendor_tokens);
        warn!(
            model = %id,
            provider = %provider,
            "Model not in registry; routing by identifier pattern"
        );
        let output_token_floor = match provider {
            ProviderKind::Gemini => family_output_floor(id),
            ProviderKind::OpenRouter => None,
        };

        ResolvedModel {
            spec: ModelSpec {
                id: id.to_string(),
                display_name: id.to_string(),
                provider,
                output_token_floor,
            },
            source: RouteSource::Heuristic,
        }
    }
}

/// Substring fallback for identifiers missing from the registry.
pub fn classify_by_pattern(id: &str, alternate_vendor_tokens: &[String]) -> ProviderKind {
    let lower = id.to_ascii_lowercase();
    if lower.contains('/')
        || alternate_vendor_tokens
            .iter()
            .any(|token| lower.contains(token.as_str()))
    {
        ProviderKind::OpenRouter
    } else {
        ProviderKind::Gemini
    }
}

/// Output floor by model family tag: `pro` models are the most verbose.
pub fn family_output_floor(id: &str) -> Option<u32> {
    let lower = id.to_ascii_lowercase();
    let mut floor = None;
    for segment in lower.split(['-', ':', '.', '_']) {
        match segment {
            "pro" => return Some(PRO_OUTPUT_FLOOR),
            "flash" => floor = Some(FLASH_OUTPUT_FLOOR),
            _ => {}
        }
    }
    floor
}
