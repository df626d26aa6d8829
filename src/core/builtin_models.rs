//! Built-in model registry
//!
//! Known model identifiers and the provider that serves each one, loaded from
//! the embedded `builtins/models.toml` table.

use serde::Deserialize;

use crate::core::models::ModelSpec;

#[derive(Debug, Deserialize)]
struct BuiltinModelsConfig {
    models: Vec<ModelSpec>,
}

/// Load built-in models from the embedded configuration
pub fn load_builtin_models() -> Vec<ModelSpec> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/models.toml");

    let config: BuiltinModelsConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/models.toml");

    config.models
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ProviderKind;

    #[test]
    fn test_load_builtin_models() {
        let models = load_builtin_models();
        assert!(!models.is_empty());

        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert!(ids.contains(&"gemini-2.5-flash"));
        assert!(ids.contains(&"qwen/qwen3-4b:free"));
    }

    #[test]
    fn test_builtin_model_properties() {
        for model in load_builtin_models() {
            assert!(!model.id.is_empty());
            assert!(!model.display_name.is_empty());

            // Slash-separated ids are OpenRouter's vendor/model convention
            if model.id.contains('/') {
                assert_eq!(model.provider, ProviderKind::OpenRouter, "{}", model.id);
                assert!(model.output_token_floor.is_none());
            } else {
                assert_eq!(model.provider, ProviderKind::Gemini, "{}", model.id);
            }
        }
    }
}
