//! Usage event aggregate
//!
//! An event is opened in EXIT by a checkout and closed in ENTRY by a
//! check-in. The transition happens once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CarId, DriverId, EventId, ManagerId};

use crate::error::{FleetError, FleetResult};
use crate::values::{Rule, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Vehicle left the yard; the event is open
    Exit,
    /// Vehicle returned; the event is closed
    Entry,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Exit => "EXIT",
            EventStatus::Entry => "ENTRY",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXIT" => Ok(EventStatus::Exit),
            "ENTRY" => Ok(EventStatus::Entry),
            _ => Err(ValidationError::new("status", Rule::Format)),
        }
    }
}

/// Persisted representation of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub manager_id: ManagerId,
    pub driver_id: DriverId,
    pub car_id: CarId,
    pub odometer: u64,
    pub status: EventStatus,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    manager_id: ManagerId,
    driver_id: DriverId,
    car_id: CarId,
    odometer: u64,
    status: EventStatus,
    start_at: DateTime<Utc>,
    end_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Opens a usage event for a checkout
    pub fn checkout(
        manager_id: ManagerId,
        driver_id: DriverId,
        car_id: CarId,
        odometer: u64,
        start_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new_v7(),
            manager_id,
            driver_id,
            car_id,
            odometer,
            status: EventStatus::Exit,
            start_at,
            end_at: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn manager_id(&self) -> ManagerId {
        self.manager_id
    }

    pub fn driver_id(&self) -> DriverId {
        self.driver_id
    }

    pub fn car_id(&self) -> CarId {
        self.car_id
    }

    /// Checkout reading while open, return reading once finalized
    pub fn odometer(&self) -> u64 {
        self.odometer
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == EventStatus::Exit
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.end_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Closes the event with the return reading
    pub fn finalize(&mut self, end_at: DateTime<Utc>, odometer: u64) -> FleetResult<()> {
        if !self.is_open() {
            return Err(FleetError::EventAlreadyFinalized(self.id));
        }
        self.status = EventStatus::Entry;
        self.end_at = Some(end_at);
        self.odometer = odometer;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            id: self.id,
            manager_id: self.manager_id,
            driver_id: self.driver_id,
            car_id: self.car_id,
            odometer: self.odometer,
            status: self.status,
            start_at: self.start_at,
            end_at: self.end_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = ValidationError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        // end_at is present exactly when the event is closed
        if (record.status == EventStatus::Entry) != record.end_at.is_some() {
            return Err(ValidationError::new("end_at", Rule::Format));
        }
        Ok(Self {
            id: record.id,
            manager_id: record.manager_id,
            driver_id: record.driver_id,
            car_id: record.car_id,
            odometer: record.odometer,
            status: record.status,
            start_at: record.start_at,
            end_at: record.end_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
