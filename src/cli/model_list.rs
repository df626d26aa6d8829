use crate::core::config::Config;
use crate::core::models::ModelRegistry;

pub fn list_models(config: &Config) {
    let registry = ModelRegistry::new(&config.models, &config.alternate_vendor_tokens());
    let default_model = config.default_model();

    println!("Known models:\n");
    println!("  {:<40} {:<24} {:<11} {:>6}", "ID", "LABEL", "PROVIDER", "FLOOR");
    for spec in registry.list() {
        let id = if spec.id == default_model {
            format!("{}*", spec.id)
        } else {
            spec.id.clone()
        };
        let floor = spec
            .output_token_floor
            .map(|floor| floor.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<40} {:<24} {:<11} {:>6}",
            id, spec.display_name, spec.provider, floor
        );
    }

    println!("\n* = default model");
    let tokens = config.alternate_vendor_tokens();
    if tokens.is_empty() {
        println!("Other ids containing '/' are sent to OpenRouter; everything else to Gemini.");
    } else {
        println!(
            "Other ids containing '/' or any of [{}] are sent to OpenRouter; everything else to Gemini.",
            tokens.join(", ")
        );
    }
}
