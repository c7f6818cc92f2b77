use serde::{Deserialize, Serialize};

use super::{digits_only, required_text, Rule, ValidationError};

/// Unvalidated address input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub street: String,
    pub number: u32,
    pub district: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
}

/// Postal address of a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AddressParts")]
pub struct Address {
    street: String,
    number: u32,
    district: String,
    zip_code: String,
    city: String,
    state: String,
}

impl Address {
    pub fn new(parts: AddressParts) -> Result<Self, ValidationError> {
        let street = required_text("street", &parts.street)?;
        if parts.number == 0 {
            return Err(ValidationError::new("number", Rule::OutOfRange));
        }
        let district = required_text("district", &parts.district)?;

        let zip_code = digits_only(&parts.zip_code);
        if zip_code.is_empty() {
            return Err(ValidationError::required("zip_code"));
        }
        if zip_code.len() != 8 {
            return Err(ValidationError::new("zip_code", Rule::Format));
        }

        Ok(Self {
            street,
            number: parts.number,
            district,
            zip_code,
            city: required_text("city", &parts.city)?,
            state: required_text("state", &parts.state)?,
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn district(&self) -> &str {
        &self.district
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn to_parts(&self) -> AddressParts {
        AddressParts {
            street: self.street.clone(),
            number: self.number,
            district: self.district.clone(),
            zip_code: self.zip_code.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }
}

impl TryFrom<AddressParts> for Address {
    type Error = ValidationError;

    fn try_from(parts: AddressParts) -> Result<Self, Self::Error> {
        Self::new(parts)
    }
}
