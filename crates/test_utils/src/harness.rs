//! In-memory service harness
//!
//! Wires every fleet service over one [`InMemoryFleetStore`] and one
//! isolated event bus.

use std::sync::Arc;

use core_kernel::{EventBus, InMemoryEventBus, ManagerId, Subscription};
use domain_fleet::event::{Event, EventStatus};
use domain_fleet::ports::InMemoryFleetStore;
use domain_fleet::services::{
    CarService, CheckoutRequest, DriverService, FleetEventBus, ReportService, UsageService,
};
use domain_fleet::{Car, Driver, FleetEvent, FleetResult, OdometerPolicy};

use crate::builders::{CarRequestBuilder, DriverRequestBuilder};

pub struct TestFleet {
    pub store: Arc<InMemoryFleetStore>,
    pub bus: Arc<InMemoryEventBus<FleetEvent>>,
    pub cars: CarService,
    pub drivers: DriverService,
    pub usage: UsageService,
    pub reports: ReportService,
    pub manager_id: ManagerId,
}

impl Default for TestFleet {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFleet {
    pub fn new() -> Self {
        Self::with_policy(OdometerPolicy::default())
    }

    pub fn with_policy(policy: OdometerPolicy) -> Self {
        let store = Arc::new(InMemoryFleetStore::new());
        let bus = Arc::new(InMemoryEventBus::<FleetEvent>::new());
        let shared: FleetEventBus = bus.clone();

        Self {
            cars: CarService::new(store.clone(), store.clone()).with_event_bus(shared.clone()),
            drivers: DriverService::new(store.clone(), store.clone())
                .with_event_bus(shared.clone()),
            usage: UsageService::new(store.clone(), store.clone(), store.clone())
                .with_policy(policy)
                .with_event_bus(shared),
            reports: ReportService::new(store.clone(), store.clone(), store.clone()),
            store,
            bus,
            manager_id: ManagerId::new(),
        }
    }

    pub fn subscribe(&self) -> Subscription<FleetEvent> {
        self.bus.subscribe()
    }

    /// Registers a car with the given odometer reading
    pub async fn car_with_odometer(&self, odometer: u64) -> Car {
        self.cars
            .create_car(
                CarRequestBuilder::new()
                    .with_manager(self.manager_id)
                    .with_odometer(odometer)
                    .build(),
            )
            .await
            .expect("car registration failed")
    }

    pub async fn driver(&self) -> Driver {
        self.drivers
            .register_driver(DriverRequestBuilder::new().build())
            .await
            .expect("driver registration failed")
    }

    /// Attempts a checkout with an EXIT status
    pub async fn checkout(&self, car: &Car, driver: &Driver, odometer: u64) -> FleetResult<Event> {
        self.usage
            .create_event(CheckoutRequest {
                car_id: car.id(),
                driver_id: driver.id(),
                manager_id: self.manager_id,
                odometer,
                status: EventStatus::Exit,
            })
            .await
    }
}
