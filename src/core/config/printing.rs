use crate::core::config::data::Config;
use crate::core::models::ProviderKind;

fn redact(key: Option<&str>) -> String {
    match key {
        Some(key) if key.chars().count() > 8 => {
            format!("{}… (set)", key.chars().take(4).collect::<String>())
        }
        Some(_) => "(set)".to_string(),
        None => "(unset)".to_string(),
    }
}

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  listen: {}", self.bind_address());
        println!("  default-model: {}", self.default_model());
        match &self.default_behaviour {
            Some(behaviour) => println!("  default-behaviour: {behaviour}"),
            None => println!("  default-behaviour: (unset)"),
        }
        println!("  request-timeout: {}s", self.request_timeout().as_secs());
        println!("  safety-threshold: {}", self.safety.threshold.as_config_str());
        println!(
            "  alternate-vendor-tokens: {}",
            self.alternate_vendor_tokens().join(", ")
        );
        for provider in [ProviderKind::Gemini, ProviderKind::OpenRouter] {
            println!("  {}:", provider.id());
            println!("    base-url: {}", self.provider_base_url(provider));
            println!(
                "    {}: {}",
                provider.credential_env_var(),
                redact(self.provider_api_key(provider))
            );
        }
        if !self.models.is_empty() {
            println!("  custom-models:");
            for model in &self.models {
                println!("    {} ({})", model.id, model.provider);
            }
        }
        if !self.presets.is_empty() {
            println!("  custom-presets:");
            for preset in &self.presets {
                println!("    {}", preset.id);
            }
        }
    }
}
