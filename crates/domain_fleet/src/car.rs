//! Car aggregate
//!
//! A car is created active and AVAILABLE. Its odometer only moves forward,
//! and its status mirrors whether an open usage event references it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CarId, ManagerId};

use crate::error::{FleetError, FleetResult};
use crate::odometer::OdometerViolation;
use crate::values::{required_text, LicensePlate, Renavam, Rule, ValidationError};

/// Availability of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    InUse,
    InMaintenance,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "AVAILABLE",
            CarStatus::InUse => "IN_USE",
            CarStatus::InMaintenance => "IN_MAINTENANCE",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(CarStatus::Available),
            "IN_USE" => Ok(CarStatus::InUse),
            "IN_MAINTENANCE" => Ok(CarStatus::InMaintenance),
            _ => Err(ValidationError::new("status", Rule::Format)),
        }
    }
}

/// Descriptive car attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarDetails {
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub color: String,
}

impl CarDetails {
    fn validated(self) -> Result<Self, ValidationError> {
        if self.year == 0 {
            return Err(ValidationError::new("year", Rule::OutOfRange));
        }
        Ok(Self {
            brand: required_text("brand", &self.brand)?,
            model: required_text("model", &self.model)?,
            year: self.year,
            color: required_text("color", &self.color)?,
        })
    }
}

/// Partial change to the descriptive attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarDetailsUpdate {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    pub color: Option<String>,
}

impl CarDetailsUpdate {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none() && self.model.is_none() && self.year.is_none() && self.color.is_none()
    }
}

/// Persisted representation of a car
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRecord {
    pub id: CarId,
    pub manager_id: ManagerId,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub color: String,
    pub odometer: u64,
    pub status: CarStatus,
    pub renavam: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub inactive_at: Option<DateTime<Utc>>,
}

/// A fleet vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    id: CarId,
    manager_id: ManagerId,
    license_plate: LicensePlate,
    renavam: Renavam,
    details: CarDetails,
    odometer: u64,
    status: CarStatus,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    inactive_at: Option<DateTime<Utc>>,
}

impl Car {
    /// Registers a new, active and available car
    pub fn register(
        manager_id: ManagerId,
        license_plate: LicensePlate,
        renavam: Renavam,
        details: CarDetails,
        odometer: u64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: CarId::new_v7(),
            manager_id,
            license_plate,
            renavam,
            details: details.validated()?,
            odometer,
            status: CarStatus::Available,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            inactive_at: None,
        })
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn manager_id(&self) -> ManagerId {
        self.manager_id
    }

    pub fn license_plate(&self) -> &LicensePlate {
        &self.license_plate
    }

    pub fn renavam(&self) -> &Renavam {
        &self.renavam
    }

    pub fn brand(&self) -> &str {
        &self.details.brand
    }

    pub fn model(&self) -> &str {
        &self.details.model
    }

    pub fn year(&self) -> u16 {
        self.details.year
    }

    pub fn color(&self) -> &str {
        &self.details.color
    }

    pub fn odometer(&self) -> u64 {
        self.odometer
    }

    pub fn status(&self) -> CarStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn inactive_at(&self) -> Option<DateTime<Utc>> {
        self.inactive_at
    }

    /// Moves the odometer forward; a lower reading is rejected
    pub fn update_odometer(&mut self, odometer: u64) -> FleetResult<()> {
        if odometer < self.odometer {
            return Err(FleetError::invalid_odometer(
                self.odometer,
                odometer,
                OdometerViolation::Decrease,
            ));
        }
        self.odometer = odometer;
        self.touch();
        Ok(())
    }

    /// Applies a partial change to brand, model, year and color
    pub fn update_car(&mut self, update: CarDetailsUpdate) -> Result<(), ValidationError> {
        let details = CarDetails {
            brand: update.brand.unwrap_or_else(|| self.details.brand.clone()),
            model: update.model.unwrap_or_else(|| self.details.model.clone()),
            year: update.year.unwrap_or(self.details.year),
            color: update.color.unwrap_or_else(|| self.details.color.clone()),
        }
        .validated()?;

        self.details = details;
        self.touch();
        Ok(())
    }

    pub fn update_license_plate(&mut self, license_plate: LicensePlate) {
        self.license_plate = license_plate;
        self.touch();
    }

    pub fn update_renavam(&mut self, renavam: Renavam) {
        self.renavam = renavam;
        self.touch();
    }

    /// Marks the car inactive. Returns false if it already was.
    pub fn inactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        let now = Utc::now();
        self.is_active = false;
        self.inactive_at = Some(now);
        self.updated_at = Some(now);
        true
    }

    pub fn mark_in_use(&mut self) {
        self.status = CarStatus::InUse;
        self.touch();
    }

    pub fn mark_available(&mut self) {
        self.status = CarStatus::Available;
        self.touch();
    }

    pub fn to_record(&self) -> CarRecord {
        CarRecord {
            id: self.id,
            manager_id: self.manager_id,
            license_plate: self.license_plate.as_str().to_string(),
            brand: self.details.brand.clone(),
            model: self.details.model.clone(),
            year: self.details.year,
            color: self.details.color.clone(),
            odometer: self.odometer,
            status: self.status,
            renavam: self.renavam.as_str().to_string(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            inactive_at: self.inactive_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl TryFrom<CarRecord> for Car {
    type Error = ValidationError;

    fn try_from(record: CarRecord) -> Result<Self, Self::Error> {
        let details = CarDetails {
            brand: record.brand,
            model: record.model,
            year: record.year,
            color: record.color,
        }
        .validated()?;

        Ok(Self {
            id: record.id,
            manager_id: record.manager_id,
            license_plate: LicensePlate::parse(&record.license_plate)?,
            renavam: Renavam::parse(&record.renavam)?,
            details,
            odometer: record.odometer,
            status: record.status,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            inactive_at: record.inactive_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car() -> Car {
        Car::register(
            ManagerId::new(),
            LicensePlate::parse("ABC1D23").unwrap(),
            Renavam::parse("12345678901").unwrap(),
            CarDetails {
                brand: "Fiat".to_string(),
                model: "Argo".to_string(),
                year: 2022,
                color: "Branco".to_string(),
            },
            1000,
        )
        .unwrap()
    }

    #[test]
    fn test_register_defaults() {
        let car = car();
        assert_eq!(car.status(), CarStatus::Available);
        assert!(car.is_active());
        assert!(car.updated_at().is_none());
        assert!(car.inactive_at().is_none());
    }

    #[test]
    fn test_update_odometer_rejects_decrease() {
        let mut car = car();
        let err = car.update_odometer(999).unwrap_err();
        assert!(matches!(
            err,
            FleetError::InvalidOdometer { violation: OdometerViolation::Decrease, .. }
        ));
        assert_eq!(car.odometer(), 1000);
        assert!(car.updated_at().is_none());

        car.update_odometer(1500).unwrap();
        assert_eq!(car.odometer(), 1500);
        assert!(car.updated_at().is_some());
    }

    #[test]
    fn test_inactivate_is_one_way_and_not_restamped() {
        let mut car = car();
        assert!(car.inactivate());
        let stamped = car.inactive_at();

        assert!(!car.inactivate());
        assert_eq!(car.inactive_at(), stamped);
        assert!(!car.is_active());
    }

    #[test]
    fn test_update_car_keeps_unspecified_fields() {
        let mut car = car();
        car.update_car(CarDetailsUpdate {
            color: Some("Preto".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(car.color(), "Preto");
        assert_eq!(car.brand(), "Fiat");
    }

    #[test]
    fn test_update_car_rejects_blank_brand() {
        let mut car = car();
        let result = car.update_car(CarDetailsUpdate {
            brand: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(result, Err(ValidationError::required("brand")));
        assert_eq!(car.brand(), "Fiat");
    }

    #[test]
    fn test_record_round_trip_revalidates() {
        let car = car();
        let rebuilt = Car::try_from(car.to_record()).unwrap();
        assert_eq!(car, rebuilt);

        let mut record = car.to_record();
        record.license_plate = "INVALID".to_string();
        assert!(Car::try_from(record).is_err());
    }
}
