//! Domain Adapters
//!
//! Implementations of the fleet repository ports over PostgreSQL.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresFleetStore;
//! use domain_fleet::services::CarService;
//! use std::sync::Arc;
//!
//! let store = Arc::new(PostgresFleetStore::new(pool));
//! let cars = CarService::new(store.clone(), store.clone());
//! ```

pub mod fleet;

pub use fleet::{FleetCounts, PostgresFleetStore};
