use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{DriverId, PortError};

use crate::driver::{Driver, DriverProfile, LicenseCategory, ProfileChanges};
use crate::error::{FleetError, FleetResult, Resource};
use crate::events::FleetEvent;
use crate::ports::{DriverRepository, EventRepository};
use crate::values::{Address, AddressParts, Cnh, Email, Name, Phone};

use super::{non_empty, publish, FleetEventBus};

/// Address fields as submitted
#[derive(Debug, Clone, Default)]
pub struct AddressInput {
    pub street: String,
    pub number: u32,
    pub district: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
}

impl From<AddressInput> for AddressParts {
    fn from(input: AddressInput) -> Self {
        AddressParts {
            street: input.street,
            number: input.number,
            district: input.district,
            zip_code: input.zip_code,
            city: input.city,
            state: input.state,
        }
    }
}

/// Request for registering a driver
#[derive(Debug, Clone)]
pub struct CreateDriverRequest {
    pub first_name: String,
    pub last_name: String,
    pub cnh: String,
    pub cnh_type: String,
    pub email: String,
    pub phone: String,
    pub address: AddressInput,
}

/// Partial profile update
///
/// The address is replaced only when all six address fields are present.
#[derive(Debug, Clone, Default)]
pub struct UpdateDriverProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub cnh: Option<String>,
    pub cnh_type: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<u32>,
    pub district: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl UpdateDriverProfileRequest {
    fn full_address(&self) -> Option<AddressParts> {
        Some(AddressParts {
            street: self.street.clone()?,
            number: self.number?,
            district: self.district.clone()?,
            zip_code: self.zip_code.clone()?,
            city: self.city.clone()?,
            state: self.state.clone()?,
        })
    }
}

/// Driver registration and profile use cases
pub struct DriverService {
    drivers: Arc<dyn DriverRepository>,
    events: Arc<dyn EventRepository>,
    bus: Option<FleetEventBus>,
}

impl DriverService {
    pub fn new(drivers: Arc<dyn DriverRepository>, events: Arc<dyn EventRepository>) -> Self {
        Self {
            drivers,
            events,
            bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: FleetEventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Registers a driver
    ///
    /// Uniqueness is checked on email, then phone, then CNH.
    #[instrument(skip(self, request))]
    pub async fn register_driver(&self, request: CreateDriverRequest) -> FleetResult<Driver> {
        let profile = DriverProfile {
            name: Name::new(&request.first_name, &request.last_name)?,
            cnh: Cnh::parse(&request.cnh)?,
            cnh_type: request.cnh_type.parse::<LicenseCategory>()?,
            phone: Phone::parse(&request.phone)?,
            email: Email::parse(&request.email)?,
            address: Address::new(request.address.into())?,
        };

        if self.drivers.find_by_email(&profile.email).await?.is_some() {
            warn!("email already registered");
            return Err(FleetError::EmailAlreadyExists(profile.email.to_string()));
        }
        if self.drivers.find_by_phone(&profile.phone).await?.is_some() {
            warn!("phone already registered");
            return Err(FleetError::PhoneAlreadyExists(profile.phone.to_string()));
        }
        if self.drivers.find_by_cnh(&profile.cnh).await?.is_some() {
            warn!("cnh already registered");
            return Err(FleetError::CnhAlreadyExists(profile.cnh.to_string()));
        }

        let driver = Driver::register(profile);
        if let Err(error) = self.drivers.create(&driver).await {
            return Err(self.unique_clash(&driver, error).await);
        }

        info!(driver_id = %driver.id(), "driver registered");
        publish(
            self.bus.as_ref(),
            FleetEvent::DriverRegistered {
                driver_id: driver.id(),
                timestamp: Utc::now(),
            },
        );
        Ok(driver)
    }

    /// Updates a driver's profile
    ///
    /// Submitting a contact value equal to the current one is rejected.
    /// Nothing is written unless every check passes.
    #[instrument(skip(self, request), fields(driver_id = %id))]
    pub async fn update_driver_profile(
        &self,
        id: DriverId,
        request: UpdateDriverProfileRequest,
    ) -> FleetResult<Driver> {
        let mut driver = self.require(id).await?;
        let mut changes = ProfileChanges::default();

        if let Some(raw) = request.email.as_deref() {
            let email = Email::parse(raw)?;
            if &email == driver.email() {
                return Err(FleetError::SameEmail);
            }
            if self.drivers.find_by_email(&email).await?.is_some_and(|d| d.id() != id) {
                warn!("email belongs to another driver");
                return Err(FleetError::EmailAlreadyExists(email.to_string()));
            }
            changes.email = Some(email);
        }

        if let Some(raw) = request.phone.as_deref() {
            let phone = Phone::parse(raw)?;
            if &phone == driver.phone() {
                return Err(FleetError::SamePhone);
            }
            if self.drivers.find_by_phone(&phone).await?.is_some_and(|d| d.id() != id) {
                warn!("phone belongs to another driver");
                return Err(FleetError::PhoneAlreadyExists(phone.to_string()));
            }
            changes.phone = Some(phone);
        }

        if let Some(raw) = request.cnh.as_deref() {
            let cnh = Cnh::parse(raw)?;
            if &cnh == driver.cnh() {
                return Err(FleetError::SameCnh);
            }
            if self.drivers.find_by_cnh(&cnh).await?.is_some_and(|d| d.id() != id) {
                warn!("cnh belongs to another driver");
                return Err(FleetError::CnhAlreadyExists(cnh.to_string()));
            }
            changes.cnh = Some(cnh);
        }

        if request.first_name.is_some() || request.last_name.is_some() {
            let first = request.first_name.as_deref().unwrap_or(driver.name().first_name());
            let last = request.last_name.as_deref().unwrap_or(driver.name().last_name());
            changes.name = Some(Name::new(first, last)?);
        }

        if let Some(raw) = request.cnh_type.as_deref() {
            changes.cnh_type = Some(raw.parse::<LicenseCategory>()?);
        }

        if let Some(parts) = request.full_address() {
            changes.address = Some(Address::new(parts)?);
        }

        driver.update_profile(changes);
        if let Err(error) = self.drivers.save(&driver).await {
            return Err(self.unique_clash(&driver, error).await);
        }

        info!("driver profile updated");
        publish(
            self.bus.as_ref(),
            FleetEvent::DriverProfileUpdated {
                driver_id: id,
                timestamp: Utc::now(),
            },
        );
        Ok(driver)
    }

    /// Inactivates a driver that has no vehicle checked out
    #[instrument(skip(self), fields(driver_id = %id))]
    pub async fn inactivate_driver(&self, id: DriverId) -> FleetResult<Driver> {
        let mut driver = self.require(id).await?;

        if self.events.find_active_event_by_driver_id(id).await?.is_some() {
            warn!("driver has an open usage event");
            return Err(FleetError::DriverHasOpenEvent(id));
        }

        if driver.inactivate() {
            self.drivers.save(&driver).await?;
            info!("driver inactivated");
            publish(
                self.bus.as_ref(),
                FleetEvent::DriverInactivated {
                    driver_id: id,
                    timestamp: Utc::now(),
                },
            );
        }
        Ok(driver)
    }

    /// Deletes a driver that has never used a car
    #[instrument(skip(self), fields(driver_id = %id))]
    pub async fn delete_driver(&self, id: DriverId) -> FleetResult<()> {
        self.require(id).await?;

        if !self.events.find_many_by_driver_id(id).await?.is_empty() {
            warn!("driver has usage events");
            return Err(FleetError::DriverHasEvents(id));
        }

        self.drivers.delete(id).await?;

        info!("driver deleted");
        publish(
            self.bus.as_ref(),
            FleetEvent::DriverDeleted {
                driver_id: id,
                timestamp: Utc::now(),
            },
        );
        Ok(())
    }

    #[instrument(skip(self), fields(driver_id = %id))]
    pub async fn get_driver_profile(&self, id: DriverId) -> FleetResult<Driver> {
        self.require(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_drivers(&self) -> FleetResult<Vec<Driver>> {
        non_empty(self.drivers.find_all().await?, Resource::Driver)
    }

    /// Reports a store conflict on a unique key as the matching business
    /// error, checking email, then phone, then CNH
    async fn unique_clash(&self, driver: &Driver, error: PortError) -> FleetError {
        if !error.is_conflict() {
            return error.into();
        }
        let taken = |found: &Option<Driver>| {
            found
                .as_ref()
                .is_some_and(|other| other.id() != driver.id())
        };

        match self.drivers.find_by_email(driver.email()).await {
            Ok(found) if taken(&found) => {
                warn!("email registered concurrently");
                return FleetError::EmailAlreadyExists(driver.email().to_string());
            }
            Err(lookup) => return lookup.into(),
            Ok(_) => {}
        }
        match self.drivers.find_by_phone(driver.phone()).await {
            Ok(found) if taken(&found) => {
                warn!("phone registered concurrently");
                return FleetError::PhoneAlreadyExists(driver.phone().to_string());
            }
            Err(lookup) => return lookup.into(),
            Ok(_) => {}
        }
        match self.drivers.find_by_cnh(driver.cnh()).await {
            Ok(found) if taken(&found) => {
                warn!("cnh registered concurrently");
                FleetError::CnhAlreadyExists(driver.cnh().to_string())
            }
            Err(lookup) => lookup.into(),
            Ok(_) => error.into(),
        }
    }

    async fn require(&self, id: DriverId) -> FleetResult<Driver> {
        self.drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| FleetError::resource_not_found(Resource::Driver, id))
    }
}
