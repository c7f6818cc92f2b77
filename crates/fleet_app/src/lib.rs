//! Fleet Application Layer
//!
//! Loads [`AppConfig`], installs the tracing subscriber and assembles a
//! [`FleetContext`] holding every fleet service over the configured store.
//!
//! ```rust,ignore
//! use fleet_app::{AppConfig, FleetContext};
//!
//! let config = AppConfig::load()?;
//! fleet_app::telemetry::init_tracing(&config)?;
//! let context = FleetContext::from_config(&config).await?;
//! let car = context.cars.get_car_by_license_plate("BRA2E19").await?;
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod telemetry;

pub use cli::{Command, CommandLine};
pub use config::{AppConfig, ConfigError, LogFormat, StoreKind};
pub use context::{ContextError, FleetContext, StatusReport, StoreHandle};
