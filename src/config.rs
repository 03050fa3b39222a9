//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but cannot be read or parsed.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub clinic: ClinicConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted backend project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Public anon key of the project.
    pub anon_key: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Clinic identity used in contact links and exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    pub name: String,
    /// WhatsApp number in international format without `+`.
    pub whatsapp_phone: String,
    pub maps_url: String,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// When set, logs are also written to daily files in this directory.
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "alfatih-clinic.log".to_string()
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("id", "Al-Fatih", "alfatih-clinic")
}

impl AppConfig {
    /// Get config file path (platform config dir, else next to the executable).
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = project_dirs() {
            return dirs.config_dir().join("config.toml");
        }
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Where the CLI keeps the signed-in session.
    pub fn session_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("session.json")
    }

    /// Attempt to load config with detailed result.
    ///
    /// Values are not validated here; call [`AppConfig::validate`] after
    /// [`AppConfig::with_overrides`] so the environment can fill in blanks.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => ConfigLoadResult::Loaded(config),
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Apply command-line/environment overrides.
    pub fn with_overrides(mut self, url: Option<String>, anon_key: Option<String>) -> Self {
        if let Some(url) = url {
            self.backend.url = url;
        }
        if let Some(key) = anon_key {
            self.backend.anon_key = key;
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Validation("Backend URL cannot be empty".to_string()));
        }
        if !self.backend.url.starts_with("http") {
            return Err(ConfigError::Validation(
                "Backend URL must start with http:// or https://".to_string(),
            ));
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(ConfigError::Validation("Backend anon key cannot be empty".to_string()));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.clinic.whatsapp_phone.is_empty() || !self.clinic.whatsapp_phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(
                "WhatsApp phone must contain digits only".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: "Rumah Sehat Al-Fatih".to_string(),
            whatsapp_phone: "6287854179686".to_string(),
            maps_url: "https://share.google/4pWbyv6nZofVgRNCb".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig::default().with_overrides(None, Some("anon-key".to_string()))
    }

    #[test]
    fn test_default_config_requires_key() {
        assert!(AppConfig::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = valid().with_overrides(Some("https://abc.supabase.co".to_string()), None);
        assert_eq!(config.backend.url, "https://abc.supabase.co");
        assert_eq!(config.backend.anon_key, "anon-key");
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut config = valid();
        config.backend.url = "ftp://invalid".to_string();
        assert!(config.validate().is_err());

        config.backend.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_timeout() {
        let mut config = valid();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_phone_digits() {
        let mut config = valid();
        config.clinic.whatsapp_phone = "+62 878".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let content = r#"
            [backend]
            url = "https://abc.supabase.co"
            anon_key = "key"
        "#;
        let config: AppConfig = toml::from_str(content).unwrap();
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.clinic.whatsapp_phone, "6287854179686");
        assert!(config.logging.directory.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cfg").join("config.toml");

        assert!(matches!(AppConfig::try_load(&path), ConfigLoadResult::Missing));

        valid().save(&path).unwrap();
        match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(config) => assert_eq!(config.backend.anon_key, "anon-key"),
            other => panic!("expected loaded config, got {other:?}"),
        }

        std::fs::write(&path, "[backend]\nurl = 3").unwrap();
        assert!(matches!(AppConfig::try_load(&path), ConfigLoadResult::Invalid(_)));
    }

    #[test]
    fn test_empty_key_filled_by_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nurl = \"https://abc.supabase.co\"\nanon_key = \"\"\n").unwrap();

        let config = match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(config) => config,
            other => panic!("expected loaded config, got {other:?}"),
        };
        assert!(config.validate().is_err());

        let config = config.with_overrides(None, Some("real-key".to_string()));
        assert_eq!(config.backend.anon_key, "real-key");
        assert!(config.validate().is_ok());
    }
}
