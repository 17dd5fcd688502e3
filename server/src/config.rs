//! Server configuration.
//!
//! Defaults are overridden by an optional YAML file (`CONFIG_PATH`), which
//! is in turn overridden by environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use paysettle_fx::{FxError, RateEntry, RateTable};
use paysettle_ledger::SettlementConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid FX rates: {0}")]
    Rates(#[from] FxError),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// FX rate overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Replaces the standard table when non-empty.
    pub rates: Vec<RateEntry>,
}

impl FxConfig {
    /// Build the rate table used by the services.
    pub fn rate_table(&self) -> Result<RateTable, FxError> {
        if self.rates.is_empty() {
            Ok(RateTable::standard())
        } else {
            RateTable::from_entries(self.rates.iter().cloned())
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// PostgreSQL URL. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Pool size.
    pub max_connections: u32,
    /// Per-request deadline, also used for pool acquisition.
    pub request_timeout_ms: u64,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
    pub settlement: SettlementConfig,
    pub fx: FxConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            database_url: None,
            max_connections: 10,
            request_timeout_ms: 4_000,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            settlement: SettlementConfig::default(),
            fx: FxConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from `CONFIG_PATH` if set, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("CONFIG_PATH") {
            Ok(path) if !path.is_empty() => {
                let mut config = Self::from_file(&path)?;
                config.apply_overrides(|key| std::env::var(key).ok())?;
                Ok(config)
            }
            _ => Self::from_env(),
        }
    }

    /// Parse a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Overlay values found through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("PAYSETTLE_LISTEN_ADDR") {
            self.listen_addr = addr;
        }

        if let Some(port) = lookup("PAYSETTLE_LISTEN_PORT") {
            self.listen_port = parse_env("PAYSETTLE_LISTEN_PORT", port)?;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url).filter(|url| !url.is_empty());
        }

        if let Some(max) = lookup("PAYSETTLE_MAX_CONNECTIONS") {
            self.max_connections = parse_env("PAYSETTLE_MAX_CONNECTIONS", max)?;
        }

        if let Some(timeout) = lookup("PAYSETTLE_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_env("PAYSETTLE_REQUEST_TIMEOUT_MS", timeout)?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            self.log_format = match format.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" => LogFormat::Text,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "LOG_FORMAT",
                        value: format,
                    })
                }
            };
        }

        if let Some(flag) = lookup("PAYSETTLE_SERIALIZE_PER_ACCOUNT") {
            self.settlement.serialize_per_account = parse_env("PAYSETTLE_SERIALIZE_PER_ACCOUNT", flag)?;
        }

        if let Some(policy) = lookup("PAYSETTLE_RESETTLE_POLICY") {
            self.settlement.resettle_policy = parse_env("PAYSETTLE_RESETTLE_POLICY", policy)?;
        }

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_port == 0 {
            return Err(ConfigError::Invalid("Listen port cannot be 0".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::Invalid("Max connections cannot be 0".to_string()));
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("Request timeout cannot be 0".to_string()));
        }

        if matches!(&self.database_url, Some(url) if url.trim().is_empty()) {
            return Err(ConfigError::Invalid("Database URL cannot be empty".to_string()));
        }

        self.fx.rate_table()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paysettle_common::Currency;
    use paysettle_ledger::ResettlePolicy;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.database_url.is_none());
        assert!(config.settlement.serialize_per_account);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ServerConfig::default();
        config.listen_port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.database_url = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_keeps_defaults_for_missing_keys() {
        let config = ServerConfig::from_yaml(
            r#"
listen_port: 9000
database_url: postgres://localhost/paysettle
settlement:
  resettle_policy: ignore
"#,
        )
        .unwrap();

        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.listen_addr, "0.0.0.0");
        assert_eq!(config.settlement.resettle_policy, ResettlePolicy::Ignore);
        assert!(config.settlement.serialize_per_account);
    }

    #[test]
    fn test_yaml_rate_overrides() {
        let config = ServerConfig::from_yaml(
            r#"
fx:
  rates:
    - { from: usd, to: eur, rate: "0.5" }
"#,
        )
        .unwrap();

        let table = config.fx.rate_table().unwrap();
        assert_eq!(
            table.convert(dec!(10), &Currency::usd(), &Currency::eur()).unwrap(),
            dec!(5)
        );
        assert!(!table.is_supported(&Currency::rub()));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_overrides(lookup(&[
                ("PAYSETTLE_LISTEN_PORT", "9100"),
                ("DATABASE_URL", "postgres://db/paysettle"),
                ("LOG_FORMAT", "TEXT"),
                ("PAYSETTLE_SERIALIZE_PER_ACCOUNT", "false"),
                ("PAYSETTLE_RESETTLE_POLICY", "ignore"),
            ]))
            .unwrap();

        assert_eq!(config.listen_port, 9100);
        assert_eq!(config.database_url.as_deref(), Some("postgres://db/paysettle"));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.settlement.serialize_per_account);
        assert_eq!(config.settlement.resettle_policy, ResettlePolicy::Ignore);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PAYSETTLE_LISTEN_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PAYSETTLE_LISTEN_PORT", .. }));
    }
}
