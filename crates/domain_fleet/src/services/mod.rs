//! Fleet domain services
//!
//! Use-case orchestrators. Each service loads aggregates through the
//! repository ports, checks cross-aggregate rules, mutates the aggregates
//! and persists them. Every method returns [`FleetResult`]; expected
//! business conditions never panic.
//!
//! Services optionally publish a [`FleetEvent`] after a successful write.

mod car;
mod driver;
mod reports;
mod usage;

pub use car::{CarService, CreateCarRequest, UpdateCarRequest};
pub use driver::{AddressInput, CreateDriverRequest, DriverService, UpdateDriverProfileRequest};
pub use reports::{CarUsage, ReportService};
pub use usage::{CheckoutRequest, UsageService};

use std::sync::Arc;
use tracing::warn;

use core_kernel::EventBus;

use crate::error::FleetResult;
use crate::events::FleetEvent;

/// Shared handle to the process event bus
pub type FleetEventBus = Arc<dyn EventBus<FleetEvent>>;

// Publishing is best effort; a failed publish never fails the use case.
fn publish(bus: Option<&FleetEventBus>, event: FleetEvent) {
    if let Some(bus) = bus {
        let event_type = event.event_type();
        if let Err(err) = bus.publish(event) {
            warn!(event_type, error = %err, "failed to publish fleet event");
        }
    }
}

/// Turns an empty listing into `NotFound`
fn non_empty<T>(items: Vec<T>, resource: crate::error::Resource) -> FleetResult<Vec<T>> {
    if items.is_empty() {
        Err(crate::error::FleetError::NotFound(resource))
    } else {
        Ok(items)
    }
}
