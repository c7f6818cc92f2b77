//! Fleet Usage Domain
//!
//! This crate holds the vehicle usage core: cars, drivers and the usage
//! events that record a car leaving with a driver and coming back.
//!
//! # Invariants
//!
//! - A car has at most one open (EXIT) event, and its status mirrors it
//! - A car's odometer never decreases; one usage cycle may advance it by
//!   at most the policy percentage (10% by default)
//! - License plate and renavam are unique among cars; email, phone and
//!   CNH are unique among drivers
//! - Inactivation is one-way and blocked while an open event exists
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_fleet::ports::InMemoryFleetStore;
//! use domain_fleet::services::{CheckoutRequest, UsageService};
//! use domain_fleet::event::EventStatus;
//!
//! let store = Arc::new(InMemoryFleetStore::new());
//! let usage = UsageService::new(store.clone(), store.clone(), store.clone());
//!
//! let event = usage
//!     .create_event(CheckoutRequest {
//!         car_id,
//!         driver_id,
//!         manager_id,
//!         odometer: 1050,
//!         status: EventStatus::Exit,
//!     })
//!     .await?;
//! ```

pub mod car;
pub mod driver;
pub mod error;
pub mod event;
pub mod events;
pub mod i18n;
pub mod odometer;
pub mod ports;
pub mod services;
pub mod values;

pub use car::{Car, CarDetails, CarDetailsUpdate, CarRecord, CarStatus};
pub use driver::{Driver, DriverProfile, DriverRecord, LicenseCategory, ProfileChanges};
pub use error::{ErrorKind, FleetError, FleetResult, Resource};
pub use event::{Event, EventRecord, EventStatus};
pub use events::FleetEvent;
pub use odometer::{validate, OdometerPolicy, OdometerViolation};
pub use ports::{CarRepository, DriverRepository, EventRepository};
#[cfg(any(test, feature = "mock"))]
pub use ports::InMemoryFleetStore;
pub use services::{
    CarService, CarUsage, CheckoutRequest, CreateCarRequest, CreateDriverRequest, DriverService,
    FleetEventBus, ReportService, UpdateCarRequest, UpdateDriverProfileRequest, UsageService,
};
pub use values::{
    Address, AddressParts, Cnh, Email, LicensePlate, Name, Phone, Renavam, Rule, ValidationError,
};
