//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::Tag;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Game API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Clash of Clans API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token; fetching is disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.clashofclans.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Tracked clan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClanConfig {
    #[serde(default = "default_clan_tag")]
    pub tag: String,
}

fn default_clan_tag() -> String {
    "#2LG8PVY8R".to_string()
}

impl Default for ClanConfig {
    fn default() -> Self {
        Self {
            tag: default_clan_tag(),
        }
    }
}

impl ClanConfig {
    pub fn clan_tag(&self) -> Tag {
        Tag::new(&self.tag)
    }
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,

    #[serde(default = "default_telegram_base_url")]
    pub base_url: String,

    /// Public URL for webhook mode; polling is used when absent
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Long-poll timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
}

fn default_telegram_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            base_url: default_telegram_base_url(),
            webhook_url: None,
            poll_timeout_seconds: default_poll_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub clan: ClanConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            clan: ClanConfig::default(),
            telegram: TelegramConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults, then
    /// apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from environment variables.
    ///
    /// `lookup` returns the variable's value, if set. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(tag) = get("CLAN_TAG") {
            self.clan.tag = tag;
        }
        if let Some(key) = get("COC_API_KEY") {
            self.api.api_key = Some(key);
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(url) = get("RENDER_EXTERNAL_URL") {
            self.telegram.webhook_url = Some(url);
        }
        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.clan.tag.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Clan tag must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.clan.tag, "#2LG8PVY8R");
        assert_eq!(config.api.base_url, "https://api.clashofclans.com/v1");
        assert!(config.api.api_key.is_none());
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.api.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_tag() {
        let mut config = AppConfig::default();
        config.clan.tag = "  ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("CLAN_TAG", "#ABC123"),
            ("COC_API_KEY", "secret"),
            ("TELEGRAM_BOT_TOKEN", "123:xyz"),
            ("RENDER_EXTERNAL_URL", "https://bot.example.com"),
            ("PORT", "9000"),
        ]));

        assert_eq!(config.clan.tag, "#ABC123");
        assert_eq!(config.api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:xyz"));
        assert_eq!(
            config.telegram.webhook_url.as_deref(),
            Some("https://bot.example.com")
        );
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_apply_env_ignores_empty_and_bad_values() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("CLAN_TAG", ""), ("PORT", "not-a-port")]));

        assert_eq!(config.clan.tag, "#2LG8PVY8R");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\n\n[clan]\ntag = \"#QWERTY\"\n\n[api]\ntimeout_seconds = 5"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.clan.tag, "#QWERTY");
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.api.base_url, "https://api.clashofclans.com/v1");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.clan.tag, parsed.clan.tag);
    }
}
