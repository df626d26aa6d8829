use crate::core::preset::BehaviourPreset;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BuiltinPresetConfig {
    presets: Vec<BehaviourPreset>,
}

pub fn load_builtin_presets() -> Vec<BehaviourPreset> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/presets.toml");
    let config: BuiltinPresetConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/presets.toml");
    config.presets
}
