//! Driver aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::DriverId;

use crate::values::{Address, AddressParts, Cnh, Email, Name, Phone, Rule, ValidationError};

/// Driver's license category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseCategory {
    A,
    B,
    C,
    D,
    E,
}

impl LicenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseCategory::A => "A",
            LicenseCategory::B => "B",
            LicenseCategory::C => "C",
            LicenseCategory::D => "D",
            LicenseCategory::E => "E",
        }
    }
}

impl fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(LicenseCategory::A),
            "B" => Ok(LicenseCategory::B),
            "C" => Ok(LicenseCategory::C),
            "D" => Ok(LicenseCategory::D),
            "E" => Ok(LicenseCategory::E),
            "" => Err(ValidationError::required("cnh_type")),
            _ => Err(ValidationError::new("cnh_type", Rule::Format)),
        }
    }
}

/// Validated values for a new driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverProfile {
    pub name: Name,
    pub cnh: Cnh,
    pub cnh_type: LicenseCategory,
    pub phone: Phone,
    pub email: Email,
    pub address: Address,
}

/// Validated replacements; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<Name>,
    pub cnh: Option<Cnh>,
    pub cnh_type: Option<LicenseCategory>,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub address: Option<Address>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cnh.is_none()
            && self.cnh_type.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
    }
}

/// Persisted representation of a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRecord {
    pub id: DriverId,
    pub first_name: String,
    pub last_name: String,
    pub cnh: String,
    pub cnh_type: LicenseCategory,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub number: u32,
    pub district: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub inactive_at: Option<DateTime<Utc>>,
}

/// A person allowed to check vehicles out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Driver {
    id: DriverId,
    profile: DriverProfile,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    inactive_at: Option<DateTime<Utc>>,
}

impl Driver {
    pub fn register(profile: DriverProfile) -> Self {
        Self {
            id: DriverId::new_v7(),
            profile,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            inactive_at: None,
        }
    }

    pub fn id(&self) -> DriverId {
        self.id
    }

    pub fn name(&self) -> &Name {
        &self.profile.name
    }

    pub fn cnh(&self) -> &Cnh {
        &self.profile.cnh
    }

    pub fn cnh_type(&self) -> LicenseCategory {
        self.profile.cnh_type
    }

    pub fn phone(&self) -> &Phone {
        &self.profile.phone
    }

    pub fn email(&self) -> &Email {
        &self.profile.email
    }

    pub fn address(&self) -> &Address {
        &self.profile.address
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

    /// Applies validated profile changes
    pub fn update_profile(&mut self, changes: ProfileChanges) {
        if changes.is_empty() {
            return;
        }
        if let Some(name) = changes.name {
            self.profile.name = name;
        }
        if let Some(cnh) = changes.cnh {
            self.profile.cnh = cnh;
        }
        if let Some(cnh_type) = changes.cnh_type {
            self.profile.cnh_type = cnh_type;
        }
        if let Some(phone) = changes.phone {
            self.profile.phone = phone;
        }
        if let Some(email) = changes.email {
            self.profile.email = email;
        }
        if let Some(address) = changes.address {
            self.profile.address = address;
        }
        self.updated_at = Some(Utc::now());
    }

    /// Marks the driver inactive. Returns false if it already was.
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

    pub fn to_record(&self) -> DriverRecord {
        let address = self.profile.address.to_parts();
        DriverRecord {
            id: self.id,
            first_name: self.profile.name.first_name().to_string(),
            last_name: self.profile.name.last_name().to_string(),
            cnh: self.profile.cnh.as_str().to_string(),
            cnh_type: self.profile.cnh_type,
            email: self.profile.email.as_str().to_string(),
            phone: self.profile.phone.as_str().to_string(),
            street: address.street,
            number: address.number,
            district: address.district,
            zip_code: address.zip_code,
            city: address.city,
            state: address.state,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            inactive_at: self.inactive_at,
        }
    }
}

impl TryFrom<DriverRecord> for Driver {
    type Error = ValidationError;

    fn try_from(record: DriverRecord) -> Result<Self, Self::Error> {
        let profile = DriverProfile {
            name: Name::new(&record.first_name, &record.last_name)?,
            cnh: Cnh::parse(&record.cnh)?,
            cnh_type: record.cnh_type,
            phone: Phone::parse(&record.phone)?,
            email: Email::parse(&record.email)?,
            address: Address::new(AddressParts {
                street: record.street,
                number: record.number,
                district: record.district,
                zip_code: record.zip_code,
                city: record.city,
                state: record.state,
            })?,
        };

        Ok(Self {
            id: record.id,
            profile,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            inactive_at: record.inactive_at,
        })
    }
}
