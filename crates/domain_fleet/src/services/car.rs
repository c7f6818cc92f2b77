use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{CarId, ManagerId, PortError};

use crate::car::{Car, CarDetails, CarDetailsUpdate};
use crate::error::{FleetError, FleetResult, Resource};
use crate::events::FleetEvent;
use crate::ports::{CarRepository, EventRepository};
use crate::values::{LicensePlate, Renavam};

use super::{non_empty, publish, FleetEventBus};

/// Request for registering a car
#[derive(Debug, Clone)]
pub struct CreateCarRequest {
    pub manager_id: ManagerId,
    pub license_plate: String,
    pub renavam: String,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub color: String,
    pub odometer: u64,
}

/// Partial car update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateCarRequest {
    pub license_plate: Option<String>,
    pub renavam: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    pub color: Option<String>,
    pub odometer: Option<u64>,
}

/// Car registration and maintenance use cases
pub struct CarService {
    cars: Arc<dyn CarRepository>,
    events: Arc<dyn EventRepository>,
    bus: Option<FleetEventBus>,
}

impl CarService {
    pub fn new(cars: Arc<dyn CarRepository>, events: Arc<dyn EventRepository>) -> Self {
        Self {
            cars,
            events,
            bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: FleetEventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Registers a car
    ///
    /// Renavam uniqueness is checked before plate uniqueness.
    #[instrument(skip(self, request), fields(plate = %request.license_plate))]
    pub async fn create_car(&self, request: CreateCarRequest) -> FleetResult<Car> {
        let plate = LicensePlate::parse(&request.license_plate)?;
        let renavam = Renavam::parse(&request.renavam)?;

        if self.cars.find_by_renavam(&renavam).await?.is_some() {
            warn!(renavam = %renavam, "renavam already registered");
            return Err(FleetError::RenavamAlreadyExists(renavam.to_string()));
        }
        if self.cars.find_by_license_plate(&plate).await?.is_some() {
            warn!(plate = %plate, "license plate already registered");
            return Err(FleetError::LicensePlateAlreadyExists(plate.to_string()));
        }

        let car = Car::register(
            request.manager_id,
            plate,
            renavam,
            CarDetails {
                brand: request.brand,
                model: request.model,
                year: request.year,
                color: request.color,
            },
            request.odometer,
        )?;
        if let Err(error) = self.cars.create(&car).await {
            return Err(self.unique_clash(&car, error).await);
        }

        info!(car_id = %car.id(), "car registered");
        publish(
            self.bus.as_ref(),
            FleetEvent::CarRegistered {
                car_id: car.id(),
                manager_id: car.manager_id(),
                license_plate: car.license_plate().to_string(),
                timestamp: Utc::now(),
            },
        );
        Ok(car)
    }

    #[instrument(skip(self, request), fields(car_id = %id))]
    pub async fn update_car(&self, id: CarId, request: UpdateCarRequest) -> FleetResult<Car> {
        let mut car = self.require(id).await?;

        if let Some(raw) = request.license_plate.as_deref() {
            let plate = LicensePlate::parse(raw)?;
            let clash = self.cars.find_by_license_plate(&plate).await?;
            if clash.is_some_and(|other| other.id() != id) {
                warn!(plate = %plate, "license plate belongs to another car");
                return Err(FleetError::LicensePlateAlreadyExists(plate.to_string()));
            }
            car.update_license_plate(plate);
        }

        if let Some(raw) = request.renavam.as_deref() {
            let renavam = Renavam::parse(raw)?;
            let clash = self.cars.find_by_renavam(&renavam).await?;
            if clash.is_some_and(|other| other.id() != id) {
                warn!(renavam = %renavam, "renavam belongs to another car");
                return Err(FleetError::RenavamAlreadyExists(renavam.to_string()));
            }
            car.update_renavam(renavam);
        }

        let details = CarDetailsUpdate {
            brand: request.brand,
            model: request.model,
            year: request.year,
            color: request.color,
        };
        if !details.is_empty() {
            car.update_car(details)?;
        }

        if let Some(odometer) = request.odometer {
            car.update_odometer(odometer)?;
        }

        if let Err(error) = self.cars.save(&car).await {
            return Err(self.unique_clash(&car, error).await);
        }
        // Status and odometer may have moved under a concurrent checkout
        let car = self.require(id).await?;

        info!("car updated");
        publish(
            self.bus.as_ref(),
            FleetEvent::CarUpdated {
                car_id: id,
                timestamp: Utc::now(),
            },
        );
        Ok(car)
    }

    /// Deletes a car that has never been used
    #[instrument(skip(self), fields(car_id = %id))]
    pub async fn delete_car(&self, id: CarId) -> FleetResult<()> {
        self.require(id).await?;

        if !self.events.find_many_by_car_id(id).await?.is_empty() {
            warn!("car has usage events");
            return Err(FleetError::CarHasEvents(id));
        }

        self.cars.delete(id).await?;

        info!("car deleted");
        publish(
            self.bus.as_ref(),
            FleetEvent::CarDeleted {
                car_id: id,
                timestamp: Utc::now(),
            },
        );
        Ok(())
    }

    /// Inactivates a car that is not checked out
    #[instrument(skip(self), fields(car_id = %id))]
    pub async fn inactivate_car(&self, id: CarId) -> FleetResult<Car> {
        let mut car = self.require(id).await?;

        if self.events.find_active_event_by_car_id(id).await?.is_some() {
            warn!("car has an open usage event");
            return Err(FleetError::CarHasEvents(id));
        }

        if car.inactivate() {
            self.cars.save(&car).await?;
            car = self.require(id).await?;
            info!("car inactivated");
            publish(
                self.bus.as_ref(),
                FleetEvent::CarInactivated {
                    car_id: id,
                    timestamp: Utc::now(),
                },
            );
        }
        Ok(car)
    }

    #[instrument(skip(self))]
    pub async fn list_cars(&self) -> FleetResult<Vec<Car>> {
        non_empty(self.cars.find_all().await?, Resource::Car)
    }

    #[instrument(skip(self))]
    pub async fn get_car_by_license_plate(&self, license_plate: &str) -> FleetResult<Car> {
        let plate = LicensePlate::parse(license_plate)?;
        self.cars
            .find_by_license_plate(&plate)
            .await?
            .ok_or_else(|| FleetError::resource_not_found(Resource::Car, plate))
    }

    #[instrument(skip(self), fields(car_id = %id))]
    pub async fn get_car(&self, id: CarId) -> FleetResult<Car> {
        self.require(id).await
    }

    /// Reports a store conflict on a unique key as the matching business
    /// error, checking renavam before plate
    async fn unique_clash(&self, car: &Car, error: PortError) -> FleetError {
        if !error.is_conflict() {
            return error.into();
        }
        let taken = |found: &Option<Car>| {
            found
                .as_ref()
                .is_some_and(|other| other.id() != car.id())
        };

        match self.cars.find_by_renavam(car.renavam()).await {
            Ok(found) if taken(&found) => {
                warn!(renavam = %car.renavam(), "renavam registered concurrently");
                return FleetError::RenavamAlreadyExists(car.renavam().to_string());
            }
            Err(lookup) => return lookup.into(),
            Ok(_) => {}
        }
        match self.cars.find_by_license_plate(car.license_plate()).await {
            Ok(found) if taken(&found) => {
                warn!(plate = %car.license_plate(), "license plate registered concurrently");
                FleetError::LicensePlateAlreadyExists(car.license_plate().to_string())
            }
            Err(lookup) => lookup.into(),
            Ok(_) => error.into(),
        }
    }

    async fn require(&self, id: CarId) -> FleetResult<Car> {
        self.cars
            .find_by_id(id)
            .await?
            .ok_or_else(|| FleetError::resource_not_found(Resource::Car, id))
    }
}
