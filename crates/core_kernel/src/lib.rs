//! Core Kernel - Foundational types for the fleet usage system
//!
//! This crate provides the building blocks shared by the domain and
//! infrastructure crates:
//! - Strongly-typed identifiers
//! - Port error and health check types for the hexagonal architecture
//! - Periods and timezone-aware day boundaries
//! - An in-process event bus
//! - Message localisation

pub mod bus;
pub mod i18n;
pub mod identifiers;
pub mod ports;
pub mod temporal;

pub use bus::{BusError, EventBus, InMemoryEventBus, Subscription};
pub use i18n::{FluentTranslator, KeyTranslator, LocalisationError, Translator};
pub use identifiers::{CarId, DriverId, EventId, ManagerId};
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
pub use temporal::{DateRange, Period, TemporalError, Timezone};
