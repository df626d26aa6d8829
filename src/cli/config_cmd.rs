use std::error::Error;
use std::path::{Path, PathBuf};

use crate::core::config::data::{path_display, ServerConfig};
use crate::core::config::defaults::{
    DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::core::config::Config;

fn resolve_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(Config::get_config_path)
}

/// A config with every scalar default spelled out, for editing by hand.
/// Credentials are left out; they normally come from the environment.
pub fn starter_config() -> Config {
    Config {
        server: ServerConfig {
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
        },
        default_model: Some(DEFAULT_MODEL.to_string()),
        request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
        ..Default::default()
    }
}

pub fn init_config(path: Option<&Path>, force: bool) -> Result<(), Box<dyn Error>> {
    let path = resolve_path(path);
    if path.exists() && !force {
        eprintln!(
            "⚠️  Config already exists at {} (use --force to overwrite)",
            path_display(&path)
        );
        std::process::exit(1);
    }

    starter_config().save_to_path(&path)?;
    println!("✅ Wrote config to {}", path_display(&path));
    Ok(())
}

pub fn show_config(path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let path = resolve_path(path);
    let config = Config::load(Some(&path))?;
    if path.exists() {
        println!("Config file: {}", path_display(&path));
    } else {
        println!("Config file: {} (not found, using defaults)", path_display(&path));
    }
    config.print_all();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn starter_config_round_trips_and_matches_defaults() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("config.toml");

        init_config(Some(&path), false).expect("init");
        let loaded = Config::load_from_path(&path).expect("load");

        assert_eq!(loaded, starter_config());
        assert_eq!(loaded.bind_address(), Config::default().bind_address());
        assert_eq!(loaded.default_model(), Config::default().default_model());
    }
}
