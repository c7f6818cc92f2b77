//! Domain events for the fleet aggregates
//!
//! Published on the process event bus after a write succeeds. Listeners use
//! them for audit trails and integrations; the repositories stay the source
//! of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CarId, DriverId, EventId, ManagerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetEvent {
    CarRegistered {
        car_id: CarId,
        manager_id: ManagerId,
        license_plate: String,
        timestamp: DateTime<Utc>,
    },

    CarUpdated {
        car_id: CarId,
        timestamp: DateTime<Utc>,
    },

    CarInactivated {
        car_id: CarId,
        timestamp: DateTime<Utc>,
    },

    CarDeleted {
        car_id: CarId,
        timestamp: DateTime<Utc>,
    },

    DriverRegistered {
        driver_id: DriverId,
        timestamp: DateTime<Utc>,
    },

    DriverProfileUpdated {
        driver_id: DriverId,
        timestamp: DateTime<Utc>,
    },

    DriverInactivated {
        driver_id: DriverId,
        timestamp: DateTime<Utc>,
    },

    DriverDeleted {
        driver_id: DriverId,
        timestamp: DateTime<Utc>,
    },

    /// A car left with a driver
    VehicleCheckedOut {
        event_id: EventId,
        car_id: CarId,
        driver_id: DriverId,
        manager_id: ManagerId,
        odometer: u64,
        timestamp: DateTime<Utc>,
    },

    /// A car came back
    VehicleCheckedIn {
        event_id: EventId,
        car_id: CarId,
        driver_id: DriverId,
        odometer: u64,
        timestamp: DateTime<Utc>,
    },

    /// An open checkout was deleted and the car released
    CheckoutCancelled {
        event_id: EventId,
        car_id: CarId,
        timestamp: DateTime<Utc>,
    },
}

impl FleetEvent {
    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            FleetEvent::CarRegistered { .. } => "CarRegistered",
            FleetEvent::CarUpdated { .. } => "CarUpdated",
            FleetEvent::CarInactivated { .. } => "CarInactivated",
            FleetEvent::CarDeleted { .. } => "CarDeleted",
            FleetEvent::DriverRegistered { .. } => "DriverRegistered",
            FleetEvent::DriverProfileUpdated { .. } => "DriverProfileUpdated",
            FleetEvent::DriverInactivated { .. } => "DriverInactivated",
            FleetEvent::DriverDeleted { .. } => "DriverDeleted",
            FleetEvent::VehicleCheckedOut { .. } => "VehicleCheckedOut",
            FleetEvent::VehicleCheckedIn { .. } => "VehicleCheckedIn",
            FleetEvent::CheckoutCancelled { .. } => "CheckoutCancelled",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            FleetEvent::CarRegistered { timestamp, .. }
            | FleetEvent::CarUpdated { timestamp, .. }
            | FleetEvent::CarInactivated { timestamp, .. }
            | FleetEvent::CarDeleted { timestamp, .. }
            | FleetEvent::DriverRegistered { timestamp, .. }
            | FleetEvent::DriverProfileUpdated { timestamp, .. }
            | FleetEvent::DriverInactivated { timestamp, .. }
            | FleetEvent::DriverDeleted { timestamp, .. }
            | FleetEvent::VehicleCheckedOut { timestamp, .. }
            | FleetEvent::VehicleCheckedIn { timestamp, .. }
            | FleetEvent::CheckoutCancelled { timestamp, .. } => *timestamp,
        }
    }

    /// The car this event concerns, if any
    pub fn car_id(&self) -> Option<CarId> {
        match self {
            FleetEvent::CarRegistered { car_id, .. }
            | FleetEvent::CarUpdated { car_id, .. }
            | FleetEvent::CarInactivated { car_id, .. }
            | FleetEvent::CarDeleted { car_id, .. }
            | FleetEvent::VehicleCheckedOut { car_id, .. }
            | FleetEvent::VehicleCheckedIn { car_id, .. }
            | FleetEvent::CheckoutCancelled { car_id, .. } => Some(*car_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_and_car() {
        let car_id = CarId::new();
        let event = FleetEvent::CheckoutCancelled {
            event_id: EventId::new(),
            car_id,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "CheckoutCancelled");
        assert_eq!(event.car_id(), Some(car_id));

        let driver_event = FleetEvent::DriverDeleted {
            driver_id: DriverId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(driver_event.car_id(), None);
    }

    #[test]
    fn test_serialization() {
        let event = FleetEvent::CarUpdated {
            car_id: CarId::new(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("CarUpdated"));
        let back: FleetEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
