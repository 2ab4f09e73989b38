//! Application configuration management.

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum allowed gap between a split sum and the expense total, in minor units.
    #[serde(default)]
    pub split_tolerance_minor_units: u32,
    /// Currency used for zero balances of a trip with no expenses yet.
    #[serde(default = "default_base_currency")]
    pub base_currency: Currency,
    /// Maximum number of cached balance snapshots.
    #[serde(default = "default_balance_cache_capacity")]
    pub balance_cache_capacity: u64,
    /// Time-to-live of a cached balance snapshot in seconds.
    #[serde(default = "default_balance_cache_ttl")]
    pub balance_cache_ttl_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            split_tolerance_minor_units: 0,
            base_currency: default_base_currency(),
            balance_cache_capacity: default_balance_cache_capacity(),
            balance_cache_ttl_secs: default_balance_cache_ttl(),
        }
    }
}

fn default_base_currency() -> Currency {
    Currency::Inr
}

fn default_balance_cache_capacity() -> u64 {
    1_000
}

fn default_balance_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TRIPSPLIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
