use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration stored on disk.
///
/// Credentials are supplied here rather than compiled in. Example TOML:
///
/// ```toml
/// contact_email = "ops@example.com"
/// places_api_key = "fsq..."
/// weather_api_key = "..."
/// request_timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Contact identifier sent with every geocoding request, as the
    /// upstream's usage policy requires.
    pub contact_email: Option<String>,

    /// Bearer credential for the place-search provider.
    pub places_api_key: Option<String>,

    /// API key for the weather provider.
    pub weather_api_key: Option<String>,

    /// Remote call timeout in seconds; expiry surfaces as an upstream
    /// failure of the affected lookup.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn require_contact_email(&self) -> Result<&str> {
        self.contact_email.as_deref().ok_or_else(|| {
            anyhow!(
                "No contact email configured for the geocoding provider.\n\
                 Hint: set `contact_email` in config.toml."
            )
        })
    }

    pub fn require_places_api_key(&self) -> Result<&str> {
        self.places_api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured for the places provider.\n\
                 Hint: set `places_api_key` in config.toml."
            )
        })
    }

    pub fn require_weather_api_key(&self) -> Result<&str> {
        self.weather_api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured for the weather provider.\n\
                 Hint: set `weather_api_key` in config.toml."
            )
        })
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "map-explorer", "explorer")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_error_with_a_hint() {
        let cfg = Config::default();

        let err = cfg.require_contact_email().unwrap_err();
        assert!(err.to_string().contains("contact_email"));

        let err = cfg.require_places_api_key().unwrap_err();
        assert!(err.to_string().contains("places_api_key"));

        let err = cfg.require_weather_api_key().unwrap_err();
        assert!(err.to_string().contains("weather_api_key"));
    }

    #[test]
    fn timeout_defaults_and_can_be_overridden() {
        let cfg = Config::default();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let cfg = Config { request_timeout_secs: Some(3), ..Default::default() };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn parses_a_full_config_file() {
        let toml = r#"
            contact_email = "ops@example.com"
            places_api_key = "fsq-key"
            weather_api_key = "ow-key"
            request_timeout_secs = 5
        "#;

        let cfg: Config = toml::from_str(toml).expect("config should parse");
        assert_eq!(cfg.require_contact_email().unwrap(), "ops@example.com");
        assert_eq!(cfg.require_places_api_key().unwrap(), "fsq-key");
        assert_eq!(cfg.require_weather_api_key().unwrap(), "ow-key");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_config_files_are_valid() {
        let cfg: Config = toml::from_str("weather_api_key = \"ow-key\"").expect("should parse");
        assert!(cfg.require_contact_email().is_err());
        assert_eq!(cfg.require_weather_api_key().unwrap(), "ow-key");
    }
}
