//! Application configuration management.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Hour bank ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
///
/// The time zone decides which calendar day "now" falls on, and therefore
/// which fortnight is open.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// IANA time zone used to derive today's date and entry fallback dates.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Ceiling applied to workers whose settings carry none.
    #[serde(default = "default_balance_ceiling")]
    pub default_balance_ceiling: Decimal,
    /// Number of months in the trailing trend, current month included.
    #[serde(default = "default_trend_months")]
    pub trend_months: u32,
}

fn default_timezone() -> Tz {
    Tz::America__Sao_Paulo
}

fn default_balance_ceiling() -> Decimal {
    Decimal::new(70, 0)
}

fn default_trend_months() -> u32 {
    6
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            default_balance_ceiling: default_balance_ceiling(),
            trend_months: default_trend_months(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Environment variables use the `HOURBANK__SECTION__KEY` form, e.g.
    /// `HOURBANK__LEDGER__TIMEZONE=Europe/Lisbon`.
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
                config::Environment::with_prefix("HOURBANK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}
