//! Fleet Domain Ports
//!
//! Persistence-agnostic repository traits for the three aggregates.
//!
//! # Contract
//!
//! - `find_*` returns `Ok(None)` on a miss, never an error
//! - every write is atomic per aggregate
//! - unique keys (plate, renavam, email, phone, CNH) are enforced by the
//!   store and reported as `PortError::Conflict`
//! - the usage writes on [`EventRepository`] touch an event and its car in
//!   one atomic unit, and guarantee at most one open event per car
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_fleet::ports::InMemoryFleetStore;
//! use domain_fleet::services::CarService;
//!
//! let store = Arc::new(InMemoryFleetStore::new());
//! let cars = CarService::new(store.clone(), store.clone());
//! ```

use async_trait::async_trait;

use core_kernel::{CarId, DomainPort, DriverId, EventId, Period, PortError};

use crate::car::Car;
use crate::driver::Driver;
use crate::event::Event;
use crate::values::{Cnh, Email, LicensePlate, Phone, Renavam};

#[async_trait]
pub trait CarRepository: DomainPort {
    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, PortError>;

    async fn find_by_license_plate(&self, plate: &LicensePlate) -> Result<Option<Car>, PortError>;

    async fn find_by_renavam(&self, renavam: &Renavam) -> Result<Option<Car>, PortError>;

    /// All cars, oldest first
    async fn find_all(&self) -> Result<Vec<Car>, PortError>;

    /// Inserts a new car; fails with `Conflict` on a duplicate id or unique key
    async fn create(&self, car: &Car) -> Result<(), PortError>;

    /// Upserts by id
    ///
    /// Status and odometer belong to the usage writes: an existing car keeps
    /// its stored status and its odometer never moves backwards.
    async fn save(&self, car: &Car) -> Result<(), PortError>;

    /// Removes a car; `NotFound` if it does not exist
    async fn delete(&self, id: CarId) -> Result<(), PortError>;
}

#[async_trait]
pub trait DriverRepository: DomainPort {
    async fn find_by_id(&self, id: DriverId) -> Result<Option<Driver>, PortError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Driver>, PortError>;

    async fn find_by_cnh(&self, cnh: &Cnh) -> Result<Option<Driver>, PortError>;

    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Driver>, PortError>;

    /// All drivers, oldest first
    async fn find_all(&self) -> Result<Vec<Driver>, PortError>;

    async fn create(&self, driver: &Driver) -> Result<(), PortError>;

    async fn save(&self, driver: &Driver) -> Result<(), PortError>;

    async fn delete(&self, id: DriverId) -> Result<(), PortError>;
}

/// Usage event persistence
///
/// Listings are ordered by `start_at`.
#[async_trait]
pub trait EventRepository: DomainPort {
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, PortError>;

    async fn find_all(&self) -> Result<Vec<Event>, PortError>;

    async fn find_active_event_by_car_id(&self, car_id: CarId) -> Result<Option<Event>, PortError>;

    async fn find_active_event_by_driver_id(
        &self,
        driver_id: DriverId,
    ) -> Result<Option<Event>, PortError>;

    async fn find_many_by_car_id(&self, car_id: CarId) -> Result<Vec<Event>, PortError>;

    async fn find_many_by_driver_id(&self, driver_id: DriverId) -> Result<Vec<Event>, PortError>;

    /// Events whose `start_at` lies in the period
    async fn find_many_by_period(&self, period: Period) -> Result<Vec<Event>, PortError>;

    async fn find_many_by_driver_and_period(
        &self,
        driver_id: DriverId,
        period: Period,
    ) -> Result<Vec<Event>, PortError>;

    async fn create(&self, event: &Event) -> Result<(), PortError>;

    async fn save(&self, event: &Event) -> Result<(), PortError>;

    async fn delete(&self, id: EventId) -> Result<(), PortError>;

    /// Stores a new open event together with its car.
    ///
    /// Only the car's status, odometer and `updated_at` are written by the
    /// usage writes. Fails with `Conflict` when the car already has an open
    /// event.
    async fn record_checkout(&self, event: &Event, car: &Car) -> Result<(), PortError>;

    /// Stores a finalized event together with its car.
    ///
    /// Fails with `Conflict` when the stored event is no longer open.
    async fn record_check_in(&self, event: &Event, car: &Car) -> Result<(), PortError>;

    /// Removes an open event and stores its car.
    ///
    /// Fails with `Conflict` when the stored event is no longer open.
    async fn discard_open_event(&self, event_id: EventId, car: &Car) -> Result<(), PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub use memory::InMemoryFleetStore;

/// In-memory store for tests and demos
#[cfg(any(test, feature = "mock"))]
pub mod memory {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};

    use crate::car::CarRecord;

    #[derive(Debug, Default)]
    struct Tables {
        cars: HashMap<CarId, Car>,
        drivers: HashMap<DriverId, Driver>,
        events: HashMap<EventId, Event>,
    }

    impl Tables {
        fn car_conflict(&self, car: &Car) -> Option<String> {
            self.cars
                .values()
                .filter(|c| c.id() != car.id())
                .find_map(|c| {
                    if c.license_plate() == car.license_plate() {
                        Some(format!("license plate {} already registered", car.license_plate()))
                    } else if c.renavam() == car.renavam() {
                        Some(format!("renavam {} already registered", car.renavam()))
                    } else {
                        None
                    }
                })
        }

        fn driver_conflict(&self, driver: &Driver) -> Option<String> {
            self.drivers
                .values()
                .filter(|d| d.id() != driver.id())
                .find_map(|d| {
                    if d.email() == driver.email() {
                        Some(format!("email {} already registered", driver.email()))
                    } else if d.phone() == driver.phone() {
                        Some(format!("phone {} already registered", driver.phone()))
                    } else if d.cnh() == driver.cnh() {
                        Some(format!("cnh {} already registered", driver.cnh()))
                    } else {
                        None
                    }
                })
        }

        fn open_event_for_car(&self, car_id: CarId) -> Option<&Event> {
            self.events
                .values()
                .find(|e| e.car_id() == car_id && e.is_open())
        }

        fn events_where(&self, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
            let mut events: Vec<Event> = self
                .events
                .values()
                .filter(|e| predicate(*e))
                .cloned()
                .collect();
            events.sort_by_key(|e| (e.start_at(), e.id()));
            events
        }

        /// Writes the usage state of `car` onto the stored car
        fn apply_usage(&mut self, car: &Car) -> Result<(), PortError> {
            let stored = self
                .cars
                .get(&car.id())
                .ok_or_else(|| PortError::not_found("Car", car.id()))?;
            let merged = merge_car(stored.to_record(), |record| {
                record.status = car.status();
                record.odometer = car.odometer();
                record.updated_at = car.updated_at();
            })?;
            self.cars.insert(car.id(), merged);
            Ok(())
        }

        fn require_open(&self, event_id: EventId) -> Result<(), PortError> {
            match self.events.get(&event_id) {
                Some(stored) if stored.is_open() => Ok(()),
                Some(_) => Err(PortError::conflict(format!("event {} is not open", event_id))),
                None => Err(PortError::not_found("Event", event_id)),
            }
        }
    }

    fn merge_car(
        mut record: CarRecord,
        apply: impl FnOnce(&mut CarRecord),
    ) -> Result<Car, PortError> {
        apply(&mut record);
        Car::try_from(record).map_err(|e| PortError::transformation(e.to_string()))
    }

    /// All three repositories over one lock
    ///
    /// Every usage write holds the write lock for its whole unit, so the
    /// one-open-event-per-car rule cannot be raced.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryFleetStore {
        tables: Arc<RwLock<Tables>>,
    }

    impl InMemoryFleetStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of stored cars, drivers and events
        pub async fn counts(&self) -> (usize, usize, usize) {
            let tables = self.tables.read().await;
            (tables.cars.len(), tables.drivers.len(), tables.events.len())
        }
    }

    impl DomainPort for InMemoryFleetStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryFleetStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "in-memory-fleet-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("In-memory store always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl CarRepository for InMemoryFleetStore {
        async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, PortError> {
            Ok(self.tables.read().await.cars.get(&id).cloned())
        }

        async fn find_by_license_plate(
            &self,
            plate: &LicensePlate,
        ) -> Result<Option<Car>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables.cars.values().find(|c| c.license_plate() == plate).cloned())
        }

        async fn find_by_renavam(&self, renavam: &Renavam) -> Result<Option<Car>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables.cars.values().find(|c| c.renavam() == renavam).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Car>, PortError> {
            let tables = self.tables.read().await;
            let mut cars: Vec<Car> = tables.cars.values().cloned().collect();
            cars.sort_by_key(|c| (c.created_at(), c.id()));
            Ok(cars)
        }

        async fn create(&self, car: &Car) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            if tables.cars.contains_key(&car.id()) {
                return Err(PortError::conflict(format!("car {} already exists", car.id())));
            }
            if let Some(message) = tables.car_conflict(car) {
                return Err(PortError::conflict(message));
            }
            tables.cars.insert(car.id(), car.clone());
            Ok(())
        }

        async fn save(&self, car: &Car) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            if let Some(message) = tables.car_conflict(car) {
                return Err(PortError::conflict(message));
            }
            let car = match tables.cars.get(&car.id()) {
                Some(stored) => merge_car(car.to_record(), |record| {
                    record.status = stored.status();
                    record.odometer = record.odometer.max(stored.odometer());
                })?,
                None => car.clone(),
            };
            tables.cars.insert(car.id(), car);
            Ok(())
        }

        async fn delete(&self, id: CarId) -> Result<(), PortError> {
            self.tables
                .write()
                .await
                .cars
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Car", id))
        }
    }

    #[async_trait]
    impl DriverRepository for InMemoryFleetStore {
        async fn find_by_id(&self, id: DriverId) -> Result<Option<Driver>, PortError> {
            Ok(self.tables.read().await.drivers.get(&id).cloned())
        }

        async fn find_by_email(&self, email: &Email) -> Result<Option<Driver>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables.drivers.values().find(|d| d.email() == email).cloned())
        }

        async fn find_by_cnh(&self, cnh: &Cnh) -> Result<Option<Driver>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables.drivers.values().find(|d| d.cnh() == cnh).cloned())
        }

        async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Driver>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables.drivers.values().find(|d| d.phone() == phone).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Driver>, PortError> {
            let tables = self.tables.read().await;
            let mut drivers: Vec<Driver> = tables.drivers.values().cloned().collect();
            drivers.sort_by_key(|d| (d.created_at(), d.id()));
            Ok(drivers)
        }

        async fn create(&self, driver: &Driver) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            if tables.drivers.contains_key(&driver.id()) {
                return Err(PortError::conflict(format!("driver {} already exists", driver.id())));
            }
            if let Some(message) = tables.driver_conflict(driver) {
                return Err(PortError::conflict(message));
            }
            tables.drivers.insert(driver.id(), driver.clone());
            Ok(())
        }

        async fn save(&self, driver: &Driver) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            if let Some(message) = tables.driver_conflict(driver) {
                return Err(PortError::conflict(message));
            }
            tables.drivers.insert(driver.id(), driver.clone());
            Ok(())
        }

        async fn delete(&self, id: DriverId) -> Result<(), PortError> {
            self.tables
                .write()
                .await
                .drivers
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Driver", id))
        }
    }

    #[async_trait]
    impl EventRepository for InMemoryFleetStore {
        async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, PortError> {
            Ok(self.tables.read().await.events.get(&id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Event>, PortError> {
            Ok(self.tables.read().await.events_where(|_| true))
        }

        async fn find_active_event_by_car_id(
            &self,
            car_id: CarId,
        ) -> Result<Option<Event>, PortError> {
            Ok(self.tables.read().await.open_event_for_car(car_id).cloned())
        }

        async fn find_active_event_by_driver_id(
            &self,
            driver_id: DriverId,
        ) -> Result<Option<Event>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables
                .events_where(|e| e.driver_id() == driver_id && e.is_open())
                .into_iter()
                .next())
        }

        async fn find_many_by_car_id(&self, car_id: CarId) -> Result<Vec<Event>, PortError> {
            Ok(self.tables.read().await.events_where(|e| e.car_id() == car_id))
        }

        async fn find_many_by_driver_id(
            &self,
            driver_id: DriverId,
        ) -> Result<Vec<Event>, PortError> {
            Ok(self.tables.read().await.events_where(|e| e.driver_id() == driver_id))
        }

        async fn find_many_by_period(&self, period: Period) -> Result<Vec<Event>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .events_where(|e| period.contains(e.start_at())))
        }

        async fn find_many_by_driver_and_period(
            &self,
            driver_id: DriverId,
            period: Period,
        ) -> Result<Vec<Event>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .events_where(|e| e.driver_id() == driver_id && period.contains(e.start_at())))
        }

        async fn create(&self, event: &Event) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            if tables.events.contains_key(&event.id()) {
                return Err(PortError::conflict(format!("event {} already exists", event.id())));
            }
            if event.is_open() && tables.open_event_for_car(event.car_id()).is_some() {
                return Err(PortError::conflict(format!(
                    "car {} already has an open event",
                    event.car_id()
                )));
            }
            tables.events.insert(event.id(), event.clone());
            Ok(())
        }

        async fn save(&self, event: &Event) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            let clash = event.is_open()
                && tables
                    .open_event_for_car(event.car_id())
                    .is_some_and(|open| open.id() != event.id());
            if clash {
                return Err(PortError::conflict(format!(
                    "car {} already has an open event",
                    event.car_id()
                )));
            }
            tables.events.insert(event.id(), event.clone());
            Ok(())
        }

        async fn delete(&self, id: EventId) -> Result<(), PortError> {
            self.tables
                .write()
                .await
                .events
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Event", id))
        }

        async fn record_checkout(&self, event: &Event, car: &Car) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            if !tables.cars.contains_key(&car.id()) {
                return Err(PortError::not_found("Car", car.id()));
            }
            if tables.open_event_for_car(car.id()).is_some() {
                return Err(PortError::conflict(format!(
                    "car {} already has an open event",
                    car.id()
                )));
            }
            tables.apply_usage(car)?;
            tables.events.insert(event.id(), event.clone());
            Ok(())
        }

        async fn record_check_in(&self, event: &Event, car: &Car) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            tables.require_open(event.id())?;
            tables.apply_usage(car)?;
            tables.events.insert(event.id(), event.clone());
            Ok(())
        }

        async fn discard_open_event(&self, event_id: EventId, car: &Car) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            tables.require_open(event_id)?;
            tables.apply_usage(car)?;
            tables.events.remove(&event_id);
            Ok(())
        }
    }
}
