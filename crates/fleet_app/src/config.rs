//! Application configuration
//!
//! Values are layered: struct defaults, then an optional `fleet.toml` in
//! the working directory, then `FLEET_*` environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::Timezone;
use domain_fleet::i18n::{translator, DEFAULT_LOCALE};
use domain_fleet::odometer::DEFAULT_MAX_INCREASE_PERCENT;

/// Base name of the optional configuration file
pub const CONFIG_FILE: &str = "fleet";

/// Prefix of the environment variables read by [`AppConfig::load`]
pub const ENV_PREFIX: &str = "FLEET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("max_connections must be at least 1")]
    InvalidPoolSize,

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Unsupported locale: {0}")]
    InvalidLocale(String),
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which repository implementation backs the services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backing store
    pub store: StoreKind,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Pool size
    pub max_connections: u32,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    /// Locale used for error messages
    pub locale: String,
    /// IANA timezone used to turn calendar days into periods
    pub timezone: String,
    /// Largest accepted odometer increase, in percent
    pub odometer_max_increase_percent: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Postgres,
            database_url: "postgres://localhost/fleet".to_string(),
            max_connections: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            locale: DEFAULT_LOCALE.to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            odometer_max_increase_percent: DEFAULT_MAX_INCREASE_PERCENT,
        }
    }
}

impl AppConfig {
    /// Loads configuration from `fleet.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name(CONFIG_FILE).required(false))
                .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)),
        )
    }

    /// Loads configuration from a TOML document
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::from_str(source, config::FileFormat::Toml)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the deserializer cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }
        self.timezone()?;
        translator(&self.locale).map_err(|_| ConfigError::InvalidLocale(self.locale.clone()))?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Timezone, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    /// The database URL with any password replaced, for logging
    pub fn redacted_database_url(&self) -> String {
        match (self.database_url.find("://"), self.database_url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.database_url[scheme_end + 3..at];
                match credentials.split_once(':') {
                    Some((user, _)) => format!(
                        "{}{}:***{}",
                        &self.database_url[..scheme_end + 3],
                        user,
                        &self.database_url[at..]
                    ),
                    None => self.database_url.clone(),
                }
            }
            _ => self.database_url.clone(),
        }
    }
}
