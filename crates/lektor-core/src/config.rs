use anyhow::Result;
use config::Config;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::policy::CancellationPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Fallbacks applied when a teacher has no active policy row, plus the
/// price basis for unpriced (trial) classes.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    pub default_hours_before_class: u32,
    pub default_charge_percentage: u32,
    pub default_allow_amnesty: bool,
    pub default_trial_price: Decimal,
    pub financial_module_enabled: bool,
}

impl PolicyConfig {
    /// The policy substituted when none is stored for a teacher.
    #[must_use]
    pub const fn fallback_policy(&self) -> CancellationPolicy {
        CancellationPolicy {
            hours_before_class: self.default_hours_before_class,
            charge_percentage: self.default_charge_percentage,
            allow_amnesty: self.default_allow_amnesty,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8710)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default("policy.default_hours_before_class", 24)?
            .set_default("policy.default_charge_percentage", 50)?
            .set_default("policy.default_allow_amnesty", true)?
            .set_default("policy.default_trial_price", 25.0)?
            .set_default("policy.financial_module_enabled", true)?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads `.env` into the process environment, then builds [`Settings`].
///
/// ## Errors
/// Returns an error if configuration loading fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();
    Settings::load()
}
