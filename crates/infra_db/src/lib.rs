//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the fleet usage domain using SQLx.
//!
//! # Architecture
//!
//! - [`pool`]: connection pool configuration and schema migrations
//! - [`repositories`]: one module per table with its row type and SQL
//! - [`adapters`]: [`PostgresFleetStore`], which implements the domain's
//!   repository ports over the tables
//!
//! Writes that must change an event and its car together (checkout,
//! check-in, cancellation) run in a single transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresFleetStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/fleet")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresFleetStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{FleetCounts, PostgresFleetStore};
pub use error::DatabaseError;
pub use pool::{
    create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR,
};
