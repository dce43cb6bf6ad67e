//! Configuration module for loading and parsing the TOML service config.
//!
//! Every section is optional; a missing file yields [`Config::default`].
//! Broker secrets are not part of this file: they live in the credential
//! store named by `broker.credentials_path`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    API_BASE_URL, AUTH_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, MAX_STRIKE_COUNT, SYMBOL_MASTER_URLS,
    UPSTOX_BASE_URL,
};
use crate::error::PremiaError;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for PremiaError {
    fn from(err: ConfigError) -> Self {
        PremiaError::Config(err.to_string())
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub symbols: SymbolsConfig,
    pub margin: MarginConfig,
    /// Contract multiplier per underlying, e.g. `NIFTY = 25`.
    pub lot_sizes: BTreeMap<String, u32>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Fyers connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub api_base_url: String,
    pub auth_base_url: String,
    /// `KEY=VALUE` file holding the Fyers identity and the current token.
    pub credentials_path: PathBuf,
    /// Timeout for every outbound request, in seconds.
    pub timeout_secs: u64,
    /// Strikes requested on each side of ATM.
    pub strike_count: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            auth_base_url: AUTH_BASE_URL.to_string(),
            credentials_path: PathBuf::from(".env"),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            strike_count: MAX_STRIKE_COUNT,
        }
    }
}

impl BrokerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Symbol-master cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Local JSON mirror of the merged symbol master.
    pub cache_path: PathBuf,
    /// Symbol-master URLs, fetched and merged on every rebuild.
    pub sources: Vec<String>,
    /// Keep going when some (not all) sources fail.
    pub allow_partial: bool,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("data/symbol_cache.json"),
            sources: SYMBOL_MASTER_URLS.iter().map(|s| s.to_string()).collect(),
            allow_partial: false,
        }
    }
}

/// How `margin_required` is produced.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarginMode {
    /// Use `fixed_margin` for every row.
    #[default]
    Fixed,
    /// Ask the Upstox margin endpoint per row.
    Broker,
}

/// Margin annotation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    pub mode: MarginMode,
    /// Stand-in margin used in `fixed` mode.
    pub fixed_margin: f64,
    pub upstox_base_url: String,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            mode: MarginMode::Fixed,
            fixed_margin: 0.0,
            upstox_base_url: UPSTOX_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.lot_sizes = config
            .lot_sizes
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.broker.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "broker.timeout_secs must be positive".to_string(),
            ));
        }
        if self.broker.strike_count == 0 || self.broker.strike_count > MAX_STRIKE_COUNT {
            return Err(ConfigError::InvalidValue(format!(
                "broker.strike_count must be between 1 and {MAX_STRIKE_COUNT}"
            )));
        }
        if self.symbols.sources.is_empty() {
            return Err(ConfigError::InvalidValue(
                "at least one symbol source must be configured".to_string(),
            ));
        }
        if self.margin.fixed_margin < 0.0 {
            return Err(ConfigError::InvalidValue(
                "margin.fixed_margin cannot be negative".to_string(),
            ));
        }
        for (instrument, lot) in &self.lot_sizes {
            if *lot == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "lot size for {instrument} must be positive"
                )));
            }
        }
        Ok(())
    }
}
