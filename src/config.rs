//! Configuration loading
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! (`$CONFIG_PATH` or `config.toml`), then `APP__SECTION__KEY` environment
//! variables. A `.env` file is read first when present.

use crate::error::{ContextError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable prefix for overrides (`APP__SERVER__PORT=8080`)
const ENV_PREFIX: &str = "APP";

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub processor: ProcessorConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Age after which the maintenance sweep drops a session
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: u64,
}

fn default_max_age_ms() -> u64 {
    3_600_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_ms: default_max_age_ms(),
        }
    }
}

impl SessionConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

/// Content processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Model used for `text` queries
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Locale assigned to requests that omit `language`
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Temperature for models missing from the catalog
    #[serde(default = "default_fallback_temperature")]
    pub fallback_temperature: f32,

    /// Max tokens for models missing from the catalog
    #[serde(default = "default_fallback_max_tokens")]
    pub fallback_max_tokens: u32,
}

fn default_model() -> String {
    "basic-model".to_string()
}

fn default_language() -> String {
    "zh".to_string()
}

fn default_fallback_temperature() -> f32 {
    0.7
}

fn default_fallback_max_tokens() -> u32 {
    2000
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            default_language: default_language(),
            fallback_temperature: default_fallback_temperature(),
            fallback_max_tokens: default_fallback_max_tokens(),
        }
    }
}

impl Config {
    /// Load `.env`, the config file and environment overrides
    pub fn load() -> Result<Self> {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded environment variables from .env file");
        }

        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut config = Self::from_file(&path)?;

        // Plain PORT wins over file and APP__ settings
        if let Ok(val) = std::env::var("PORT") {
            match val.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", val),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file (optional) layered with environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ContextError::Configuration(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.processor.default_model.trim().is_empty() {
            return Err(ContextError::Configuration(
                "processor.default_model cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.processor.fallback_temperature) {
            return Err(ContextError::Configuration(format!(
                "processor.fallback_temperature {} outside 0.0..=2.0",
                self.processor.fallback_temperature
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.session.max_age_ms, 3_600_000);
        assert_eq!(config.processor.default_model, "basic-model");
        assert_eq!(config.processor.default_language, "zh");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 8081

            [processor]
            default_model = "advanced-model"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.processor.default_model, "advanced-model");
        assert_eq!(config.processor.fallback_max_tokens, 2000);
        assert_eq!(config.session.max_age(), Duration::from_secs(3600));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.processor.default_model = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.processor.fallback_temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(server.bind_address(), "127.0.0.1:9000");
    }
}
