//! Fleet domain errors
//!
//! Every expected business condition has its own variant. Services return
//! these instead of panicking; callers branch on [`FleetError::kind`] and
//! render user-facing text through [`FleetError::localize`].

use std::fmt;
use thiserror::Error;

use core_kernel::{CarId, DriverId, EventId, PortError, Translator};

use crate::odometer::OdometerViolation;
use crate::values::ValidationError;

/// Result type for fleet operations
pub type FleetResult<T> = Result<T, FleetError>;

/// The aggregate a lookup was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Car,
    Driver,
    Event,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Car => "car",
            Resource::Driver => "driver",
            Resource::Event => "event",
        })
    }
}

/// Coarse error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    HasOpenEvent,
    CannotDeleteFinalizedEvent,
    EventAlreadyFinalized,
    InvalidOdometer,
    CarInUse,
    SameValueAsCurrent,
    BadRequest,
    Infrastructure,
}

/// Errors that can occur in the fleet domain
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("{resource} not found: {id}")]
    ResourceNotFound { resource: Resource, id: String },

    /// A listing came back empty
    #[error("no {0} records found")]
    NotFound(Resource),

    #[error("Car not found: {0}")]
    CarNotFound(CarId),

    #[error("Driver not found: {0}")]
    DriverNotFound(DriverId),

    #[error("License plate already registered: {0}")]
    LicensePlateAlreadyExists(String),

    #[error("Renavam already registered: {0}")]
    RenavamAlreadyExists(String),

    #[error("Email already registered: {0}")]
    EmailAlreadyExists(String),

    #[error("Phone already registered: {0}")]
    PhoneAlreadyExists(String),

    #[error("CNH already registered: {0}")]
    CnhAlreadyExists(String),

    #[error("Car {0} has usage events")]
    CarHasEvents(CarId),

    #[error("Driver {0} has an open usage event")]
    DriverHasOpenEvent(DriverId),

    #[error("Driver {0} has usage events")]
    DriverHasEvents(DriverId),

    #[error("Event {0} is finalized and cannot be deleted")]
    CannotDeleteFinalizedEvent(EventId),

    #[error("Event {0} is already finalized")]
    EventAlreadyFinalized(EventId),

    #[error("Invalid odometer reading {proposed} (current {current}): {violation:?}")]
    InvalidOdometer {
        current: u64,
        proposed: u64,
        violation: OdometerViolation,
    },

    #[error("Car {0} is already in use")]
    CarInUse(CarId),

    #[error("Email is the same as the current one")]
    SameEmail,

    #[error("Phone is the same as the current one")]
    SamePhone,

    #[error("CNH is the same as the current one")]
    SameCnh,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Port(#[from] PortError),
}

impl FleetError {
    /// Creates a ResourceNotFound error from any id type
    pub fn resource_not_found(resource: Resource, id: impl fmt::Display) -> Self {
        FleetError::ResourceNotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn invalid_odometer(current: u64, proposed: u64, violation: OdometerViolation) -> Self {
        FleetError::InvalidOdometer {
            current,
            proposed,
            violation,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FleetError::ResourceNotFound { .. }
            | FleetError::NotFound(_)
            | FleetError::CarNotFound(_)
            | FleetError::DriverNotFound(_) => ErrorKind::NotFound,
            FleetError::LicensePlateAlreadyExists(_)
            | FleetError::RenavamAlreadyExists(_)
            | FleetError::EmailAlreadyExists(_)
            | FleetError::PhoneAlreadyExists(_)
            | FleetError::CnhAlreadyExists(_) => ErrorKind::AlreadyExists,
            FleetError::CarHasEvents(_)
            | FleetError::DriverHasOpenEvent(_)
            | FleetError::DriverHasEvents(_) => ErrorKind::HasOpenEvent,
            FleetError::CannotDeleteFinalizedEvent(_) => ErrorKind::CannotDeleteFinalizedEvent,
            FleetError::EventAlreadyFinalized(_) => ErrorKind::EventAlreadyFinalized,
            FleetError::InvalidOdometer { .. } => ErrorKind::InvalidOdometer,
            FleetError::CarInUse(_) => ErrorKind::CarInUse,
            FleetError::SameEmail | FleetError::SamePhone | FleetError::SameCnh => {
                ErrorKind::SameValueAsCurrent
            }
            FleetError::Validation(_) => ErrorKind::BadRequest,
            FleetError::Port(_) => ErrorKind::Infrastructure,
        }
    }

    /// Translation key for this error
    pub fn message_key(&self) -> &'static str {
        match self {
            FleetError::ResourceNotFound { .. } => "resource-not-found",
            FleetError::NotFound(_) => "list-empty",
            FleetError::CarNotFound(_) => "car-not-found",
            FleetError::DriverNotFound(_) => "driver-not-found",
            FleetError::LicensePlateAlreadyExists(_) => "license-plate-already-exists",
            FleetError::RenavamAlreadyExists(_) => "renavam-already-exists",
            FleetError::EmailAlreadyExists(_) => "email-already-exists",
            FleetError::PhoneAlreadyExists(_) => "phone-already-exists",
            FleetError::CnhAlreadyExists(_) => "cnh-already-exists",
            FleetError::CarHasEvents(_) => "car-has-events",
            FleetError::DriverHasOpenEvent(_) => "driver-has-open-event",
            FleetError::DriverHasEvents(_) => "driver-has-events",
            FleetError::CannotDeleteFinalizedEvent(_) => "cannot-delete-finalized-event",
            FleetError::EventAlreadyFinalized(_) => "event-already-finalized",
            FleetError::InvalidOdometer {
                violation: OdometerViolation::Decrease,
                ..
            } => "odometer-decrease",
            FleetError::InvalidOdometer {
                violation: OdometerViolation::ExcessiveIncrease,
                ..
            } => "odometer-too-high",
            FleetError::CarInUse(_) => "car-in-use",
            FleetError::SameEmail => "same-email",
            FleetError::SamePhone => "same-phone",
            FleetError::SameCnh => "same-cnh",
            FleetError::Validation(_) => "validation-failed",
            FleetError::Port(_) => "storage-failure",
        }
    }

    /// Named arguments referenced by the translated message
    pub fn message_args(&self) -> Vec<(&'static str, String)> {
        match self {
            FleetError::ResourceNotFound { resource, id } => {
                vec![("resource", resource.to_string()), ("id", id.clone())]
            }
            FleetError::NotFound(resource) => vec![("resource", resource.to_string())],
            FleetError::CarNotFound(id)
            | FleetError::CarHasEvents(id)
            | FleetError::CarInUse(id) => {
                vec![("id", id.to_string())]
            }
            FleetError::DriverNotFound(id)
            | FleetError::DriverHasOpenEvent(id)
            | FleetError::DriverHasEvents(id) => vec![("id", id.to_string())],
            FleetError::CannotDeleteFinalizedEvent(id) | FleetError::EventAlreadyFinalized(id) => {
                vec![("id", id.to_string())]
            }
            FleetError::LicensePlateAlreadyExists(value)
            | FleetError::RenavamAlreadyExists(value)
            | FleetError::EmailAlreadyExists(value)
            | FleetError::PhoneAlreadyExists(value)
            | FleetError::CnhAlreadyExists(value) => vec![("value", value.clone())],
            FleetError::InvalidOdometer { current, proposed, .. } => vec![
                ("current", current.to_string()),
                ("proposed", proposed.to_string()),
            ],
            FleetError::Validation(err) => vec![
                ("field", err.field.to_string()),
                ("rule", err.rule.to_string()),
            ],
            FleetError::SameEmail
            | FleetError::SamePhone
            | FleetError::SameCnh
            | FleetError::Port(_) => Vec::new(),
        }
    }

    /// Renders the error through a translator
    pub fn localize(&self, translator: &dyn Translator) -> String {
        translator.translate_with(self.message_key(), &self.message_args())
    }
}
