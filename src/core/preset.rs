use serde::{Deserialize, Serialize};

use crate::core::builtin_presets::load_builtin_presets;

pub const DEFAULT_PRESET_ID: &str = "explainer";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_p: 0.9,
            max_output_tokens: 4096,
        }
    }
}

impl SamplingConfig {
    /// Raises the output ceiling to `floor` when the preset asks for less.
    pub fn with_output_floor(mut self, floor: Option<u32>) -> Self {
        if let Some(floor) = floor {
            self.max_output_tokens = self.max_output_tokens.max(floor);
        }
        self
    }
}

/// One example exchange replayed ahead of the real conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FewShotExample {
    pub user: String,
    pub assistant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BehaviourPreset {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub system_prompt: String,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub examples: Vec<FewShotExample>,
}

impl BehaviourPreset {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Read-only lookup table of behaviour presets.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Vec<BehaviourPreset>,
    default_index: usize,
}

impl PresetCatalog {
    /// Built-in presets overlaid with `custom` ones; a custom preset whose id
    /// matches a built-in replaces it in place.
    pub fn new(custom: &[BehaviourPreset], default_id: Option<&str>) -> Self {
        let mut presets = load_builtin_presets();
        for preset in custom {
            match presets.iter_mut().find(|existing| existing.id == preset.id) {
                Some(existing) => *existing = preset.clone(),
                None => presets.push(preset.clone()),
            }
        }

        let default_index = default_id
            .and_then(|id| presets.iter().position(|p| p.id == id))
            .or_else(|| presets.iter().position(|p| p.id == DEFAULT_PRESET_ID))
            .unwrap_or(0);

        Self {
            presets,
            default_index,
        }
    }

    pub fn builtin() -> Self {
        Self::new(&[], None)
    }

    pub fn list(&self) -> &[BehaviourPreset] {
        &self.presets
    }

    pub fn find(&self, id: &str) -> Option<&BehaviourPreset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    pub fn default_preset(&self) -> &BehaviourPreset {
        &self.presets[self.default_index]
    }

    /// Unknown, blank or missing names resolve to the default preset.
    pub fn resolve(&self, name: Option<&str>) -> &BehaviourPreset {
        name.map(str::trim)
            .filter(|name| !name.is_empty())
            .and_then(|name| self.find(name))
            .unwrap_or_else(|| self.default_preset())
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
