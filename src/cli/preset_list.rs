use crate::core::config::Config;
use crate::core::preset::PresetCatalog;

pub fn list_presets(config: &Config) {
    let catalog = PresetCatalog::new(&config.presets, config.default_behaviour.as_deref());
    let default_id = catalog.default_preset().id.clone();

    println!("Behaviour presets:\n");
    println!(
        "  {:<18} {:<22} {:>5} {:>5} {:>7} {:>8}",
        "NAME", "LABEL", "TEMP", "TOP-P", "TOKENS", "EXAMPLES"
    );
    for preset in catalog.list() {
        let name = if preset.id == default_id {
            format!("{}*", preset.id)
        } else {
            preset.id.clone()
        };
        println!(
            "  {:<18} {:<22} {:>5.2} {:>5.2} {:>7} {:>8}",
            name,
            preset.label(),
            preset.sampling.temperature,
            preset.sampling.top_p,
            preset.sampling.max_output_tokens,
            preset.examples.len()
        );
    }
    println!("\n* = default; unknown names fall back to it");
}
