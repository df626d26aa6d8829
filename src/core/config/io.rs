use crate::core::config::data::{path_display, Config, SafetyThreshold};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        /// Path to the configuration file with invalid TOML.
        path: PathBuf,
        /// The TOML deserialization error.
        source: toml::de::Error,
    },

    /// An environment override held a value that could not be used.
    InvalidEnv { var: &'static str, value: String },
}

impl ConfigError {
    fn display_path(path: &Path) -> String {
        path_display(path)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(
                    f,
                    "Failed to read config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
            ConfigError::InvalidEnv { var, value } => {
                write!(f, "Invalid value for {var}: {value:?}")
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidEnv { .. } => None,
        }
    }
}

impl Config {
    /// Loads the config file (explicit path or the platform default) and
    /// applies environment overrides. Called once at startup.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_path(),
        };
        let mut config = Self::load_from_path(&config_path)?;
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })?;
            let config: Config =
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: config_path.to_path_buf(),
                    source,
                })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Environment variables win over file values; blank variables are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = Some(host);
        }
        if let Some(port) = get("PORT") {
            let parsed = port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
                var: "PORT",
                value: port.clone(),
            })?;
            self.server.port = Some(parsed);
        }
        if let Some(model) = get("GOOGLE_MODEL") {
            self.default_model = Some(model);
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.providers.gemini.api_key = Some(key);
        }
        if let Some(key) = get("OPENROUTER_API_KEY") {
            self.providers.openrouter.api_key = Some(key);
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            self.providers.gemini.base_url = Some(url);
        }
        if let Some(url) = get("OPENROUTER_BASE_URL") {
            self.providers.openrouter.base_url = Some(url);
        }
        if let Some(threshold) = get("NERO_SAFETY_THRESHOLD") {
            self.safety.threshold =
                SafetyThreshold::parse(&threshold).ok_or(ConfigError::InvalidEnv {
                    var: "NERO_SAFETY_THRESHOLD",
                    value: threshold.clone(),
                })?;
        }
        Ok(())
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        match ProjectDirs::from("org", "nero", "nero") {
            Some(proj_dirs) => proj_dirs.config_dir().join("config.toml"),
            None => PathBuf::from("nero.toml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ProviderKind;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("nonexistent_config.toml");

        let config = Config::load_from_path(&config_path).expect("Failed to load config");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_save_and_reload() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config {
            default_model: Some("gemini-2.5-pro".to_string()),
            request_timeout_secs: Some(30),
            ..Default::default()
        };
        config.safety.threshold = SafetyThreshold::BlockOnlyHigh;
        config.save_to_path(&config_path).expect("save failed");

        let reloaded = Config::load_from_path(&config_path).expect("reload failed");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "default_model = [").expect("write");

        let err = Config::load_from_path(&config_path).expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse config at"));
    }

    #[test]
    fn test_file_sections_parse() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
default_model = "qwen/qwen3-4b:free"
alternate_vendor_tokens = ["qwen", "mistral"]

[server]
port = 8080

[providers.openrouter]
api_key = "or-file"

[safety]
threshold = "provider_default"

[[models]]
id = "gemini-exp"
display_name = "Gemini Experimental"
provider = "gemini"
output_token_floor = 8192

[[presets]]
id = "pirate"
system_prompt = "Talk like a pirate."
"#,
        )
        .expect("write");

        let config = Config::load_from_path(&config_path).expect("load");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.default_model(), "qwen/qwen3-4b:free");
        assert_eq!(config.provider_api_key(ProviderKind::OpenRouter), Some("or-file"));
        assert_eq!(config.safety.threshold, SafetyThreshold::ProviderDefault);
        assert_eq!(config.models[0].provider, ProviderKind::Gemini);
        assert_eq!(config.presets[0].sampling.max_output_tokens, 4096);
    }

    #[test]
    fn test_env_overrides_win_over_file_values() {
        let mut config = Config {
            default_model: Some("from-file".to_string()),
            ..Default::default()
        };
        let vars = env(&[
            ("PORT", "7000"),
            ("GOOGLE_MODEL", "gemini-2.5-flash-lite"),
            ("GOOGLE_API_KEY", "g-key"),
            ("OPENROUTER_API_KEY", ""),
        ]);
        config
            .apply_env_overrides(|var| vars.get(var).cloned())
            .expect("overrides");

        assert_eq!(config.port(), 7000);
        assert_eq!(config.default_model(), "gemini-2.5-flash-lite");
        assert_eq!(config.provider_api_key(ProviderKind::Gemini), Some("g-key"));
        assert!(config.provider_api_key(ProviderKind::OpenRouter).is_none());
    }

    #[test]
    fn test_invalid_env_values_are_reported() {
        let mut config = Config::default();
        let vars = env(&[("PORT", "not-a-port")]);
        let err = config
            .apply_env_overrides(|var| vars.get(var).cloned())
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Invalid value for PORT: \"not-a-port\"");

        let vars = env(&[("NERO_SAFETY_THRESHOLD", "maximum")]);
        assert!(config
            .apply_env_overrides(|var| vars.get(var).cloned())
            .is_err());
    }
}
