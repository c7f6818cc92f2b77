//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! fleet usage test suite.
//!
//! # Modules
//!
//! - `fixtures`: Known-valid identity values and fixed timestamps
//! - `builders`: Builders for service requests with unique identity values
//! - `harness`: A wired set of services over the in-memory store
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for fleet results
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;
pub mod harness;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
pub use harness::*;
