//! Table access for the fleet aggregates
//!
//! Each table module owns its row type, the conversions between rows and
//! domain entities, and the SQL for that table. Queries are checked at
//! runtime, so the crate builds without a live database.

pub mod car;
pub mod driver;
pub mod event;

pub use car::{CarRow, CarTable};
pub use driver::{DriverRow, DriverTable};
pub use event::{EventRow, EventTable};
