use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{instrument, warn};

use core_kernel::{CarId, DriverId, Period};

use crate::car::{Car, CarRecord};
use crate::driver::{Driver, DriverRecord};
use crate::error::{FleetError, FleetResult, Resource};
use crate::event::{Event, EventRecord};
use crate::ports::{CarRepository, DriverRepository, EventRepository};

use super::non_empty;

/// A usage event joined with snapshots of its car and driver
#[derive(Debug, Clone, Serialize)]
pub struct CarUsage {
    pub event: EventRecord,
    pub car: CarRecord,
    pub driver: DriverRecord,
}

/// Read-only usage queries
///
/// Every listing fails with `NotFound` when it comes back empty.
pub struct ReportService {
    cars: Arc<dyn CarRepository>,
    drivers: Arc<dyn DriverRepository>,
    events: Arc<dyn EventRepository>,
}

impl ReportService {
    pub fn new(
        cars: Arc<dyn CarRepository>,
        drivers: Arc<dyn DriverRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self { cars, drivers, events }
    }

    #[instrument(skip(self))]
    pub async fn list_events(&self) -> FleetResult<Vec<Event>> {
        non_empty(self.events.find_all().await?, Resource::Event)
    }

    /// Events started in the period, with their car and driver
    ///
    /// Events whose car or driver no longer exists are skipped.
    #[instrument(skip(self))]
    pub async fn list_used_cars_by_period(&self, period: Period) -> FleetResult<Vec<CarUsage>> {
        let events = self.events.find_many_by_period(period).await?;
        let mut usages = Vec::with_capacity(events.len());

        for event in events {
            let car = self.cars.find_by_id(event.car_id()).await?;
            let driver = self.drivers.find_by_id(event.driver_id()).await?;
            match (car, driver) {
                (Some(car), Some(driver)) => usages.push(CarUsage {
                    event: event.to_record(),
                    car: car.to_record(),
                    driver: driver.to_record(),
                }),
                _ => {
                    warn!(event_id = %event.id(), "skipping event with missing car or driver");
                }
            }
        }

        non_empty(usages, Resource::Event)
    }

    /// Distinct cars a driver used in the period, in first-use order
    #[instrument(skip(self), fields(driver_id = %driver_id))]
    pub async fn list_driver_cars_by_period(
        &self,
        driver_id: DriverId,
        period: Period,
    ) -> FleetResult<Vec<Car>> {
        self.require_driver(driver_id).await?;

        let events = self
            .events
            .find_many_by_driver_and_period(driver_id, period)
            .await?;

        let mut seen = HashSet::new();
        let mut cars = Vec::new();
        for event in events {
            if !seen.insert(event.car_id()) {
                continue;
            }
            match self.cars.find_by_id(event.car_id()).await? {
                Some(car) => cars.push(car),
                None => warn!(car_id = %event.car_id(), "skipping missing car"),
            }
        }

        non_empty(cars, Resource::Car)
    }

    #[instrument(skip(self), fields(car_id = %car_id))]
    pub async fn list_events_by_car(&self, car_id: CarId) -> FleetResult<Vec<Event>> {
        if self.cars.find_by_id(car_id).await?.is_none() {
            return Err(FleetError::CarNotFound(car_id));
        }
        non_empty(self.events.find_many_by_car_id(car_id).await?, Resource::Event)
    }

    #[instrument(skip(self), fields(driver_id = %driver_id))]
    pub async fn list_events_by_driver(&self, driver_id: DriverId) -> FleetResult<Vec<Event>> {
        self.require_driver(driver_id).await?;
        non_empty(self.events.find_many_by_driver_id(driver_id).await?, Resource::Event)
    }

    async fn require_driver(&self, driver_id: DriverId) -> FleetResult<Driver> {
        self.drivers
            .find_by_id(driver_id)
            .await?
            .ok_or(FleetError::DriverNotFound(driver_id))
    }
}
