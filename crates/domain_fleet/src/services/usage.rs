use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{CarId, DriverId, EventId, ManagerId, PortError};

use crate::car::Car;
use crate::error::{FleetError, FleetResult, Resource};
use crate::event::{Event, EventStatus};
use crate::events::FleetEvent;
use crate::odometer::OdometerPolicy;
use crate::ports::{CarRepository, DriverRepository, EventRepository};
use crate::values::{Rule, ValidationError};

use super::{publish, FleetEventBus};

/// Request for checking a car out to a driver
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub car_id: CarId,
    pub driver_id: DriverId,
    pub manager_id: ManagerId,
    pub odometer: u64,
    /// Must be `EXIT`
    pub status: EventStatus,
}

/// Checkout, check-in and cancellation of vehicle usage
pub struct UsageService {
    cars: Arc<dyn CarRepository>,
    drivers: Arc<dyn DriverRepository>,
    events: Arc<dyn EventRepository>,
    policy: OdometerPolicy,
    bus: Option<FleetEventBus>,
}

impl UsageService {
    pub fn new(
        cars: Arc<dyn CarRepository>,
        drivers: Arc<dyn DriverRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            cars,
            drivers,
            events,
            policy: OdometerPolicy::default(),
            bus: None,
        }
    }

    pub fn with_policy(mut self, policy: OdometerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_bus(mut self, bus: FleetEventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn policy(&self) -> OdometerPolicy {
        self.policy
    }

    /// Checks a car out
    ///
    /// Checks run in order and stop at the first failure: car, driver,
    /// odometer, open event. The event and the car are then written in one
    /// atomic unit; losing a concurrent race yields `CarInUse`.
    #[instrument(
        skip(self, request),
        fields(car_id = %request.car_id, driver_id = %request.driver_id, odometer = request.odometer)
    )]
    pub async fn create_event(&self, request: CheckoutRequest) -> FleetResult<Event> {
        if request.status != EventStatus::Exit {
            return Err(ValidationError::new("status", Rule::Format).into());
        }

        let mut car = self
            .cars
            .find_by_id(request.car_id)
            .await?
            .ok_or(FleetError::CarNotFound(request.car_id))?;
        let driver = self
            .drivers
            .find_by_id(request.driver_id)
            .await?
            .ok_or(FleetError::DriverNotFound(request.driver_id))?;

        self.check_odometer(car.odometer(), request.odometer)?;

        if self.events.find_active_event_by_car_id(car.id()).await?.is_some() {
            warn!("car already checked out");
            return Err(FleetError::CarInUse(car.id()));
        }

        let event = Event::checkout(
            request.manager_id,
            driver.id(),
            car.id(),
            request.odometer,
            Utc::now(),
        );
        car.mark_in_use();

        match self.events.record_checkout(&event, &car).await {
            Ok(()) => {}
            Err(PortError::Conflict { .. }) => {
                warn!("checkout lost a concurrent race");
                return Err(FleetError::CarInUse(car.id()));
            }
            Err(err) => return Err(err.into()),
        }

        info!(event_id = %event.id(), "vehicle checked out");
        publish(
            self.bus.as_ref(),
            FleetEvent::VehicleCheckedOut {
                event_id: event.id(),
                car_id: event.car_id(),
                driver_id: event.driver_id(),
                manager_id: event.manager_id(),
                odometer: event.odometer(),
                timestamp: event.start_at(),
            },
        );
        Ok(event)
    }

    /// Checks a car back in
    ///
    /// The return reading is validated against the checkout reading.
    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn finalize_event(&self, event_id: EventId, odometer: u64) -> FleetResult<Event> {
        let mut event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| FleetError::resource_not_found(Resource::Event, event_id))?;

        if !event.is_open() {
            return Err(FleetError::EventAlreadyFinalized(event_id));
        }

        let mut car = self
            .cars
            .find_by_id(event.car_id())
            .await?
            .ok_or(FleetError::CarNotFound(event.car_id()))?;

        self.check_odometer(event.odometer(), odometer)?;

        event.finalize(Utc::now(), odometer)?;
        car.update_odometer(odometer)?;
        car.mark_available();

        match self.events.record_check_in(&event, &car).await {
            Ok(()) => {}
            Err(PortError::Conflict { .. }) => {
                warn!("event was finalized concurrently");
                return Err(FleetError::EventAlreadyFinalized(event_id));
            }
            Err(err) => return Err(err.into()),
        }

        info!(car_id = %car.id(), odometer, "vehicle checked in");
        publish(
            self.bus.as_ref(),
            FleetEvent::VehicleCheckedIn {
                event_id,
                car_id: car.id(),
                driver_id: event.driver_id(),
                odometer,
                timestamp: event.end_at().unwrap_or_else(Utc::now),
            },
        );
        Ok(event)
    }

    /// Deletes an open event and releases its car
    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn delete_event(&self, event_id: EventId) -> FleetResult<Car> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| FleetError::resource_not_found(Resource::Event, event_id))?;

        let mut car = self
            .cars
            .find_by_id(event.car_id())
            .await?
            .ok_or(FleetError::CarNotFound(event.car_id()))?;

        if !event.is_open() {
            return Err(FleetError::CannotDeleteFinalizedEvent(event_id));
        }

        car.mark_available();
        match self.events.discard_open_event(event_id, &car).await {
            Ok(()) => {}
            Err(PortError::Conflict { .. }) => {
                return Err(FleetError::CannotDeleteFinalizedEvent(event_id));
            }
            Err(err) => return Err(err.into()),
        }

        info!(car_id = %car.id(), "checkout cancelled");
        publish(
            self.bus.as_ref(),
            FleetEvent::CheckoutCancelled {
                event_id,
                car_id: car.id(),
                timestamp: Utc::now(),
            },
        );
        Ok(car)
    }

    fn check_odometer(&self, current: u64, proposed: u64) -> FleetResult<()> {
        self.policy.check(current, proposed).map_err(|violation| {
            warn!(current, proposed, ?violation, "odometer reading rejected");
            FleetError::invalid_odometer(current, proposed, violation)
        })
    }
}
