//! Self-validating value objects
//!
//! Every value object is built through a validating constructor and is
//! immutable afterwards. Deserialization goes through the same constructor,
//! so an invalid value can never be observed.

mod address;
mod cnh;
mod email;
mod license_plate;
mod name;
mod phone;
mod renavam;

pub use address::{Address, AddressParts};
pub use cnh::Cnh;
pub use email::Email;
pub use license_plate::LicensePlate;
pub use name::Name;
pub use phone::Phone;
pub use renavam::Renavam;

use std::fmt;
use thiserror::Error;

/// The rule a value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The value is missing or blank
    Required,
    /// The value does not have the expected shape
    Format,
    /// The check digits do not match
    Checksum,
    /// Every digit is the same
    RepeatedDigits,
    /// The phone area code is not assigned
    AreaCode,
    /// The value is shorter than allowed
    TooShort,
    /// The number is outside the accepted range
    OutOfRange,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Format => "format",
            Rule::Checksum => "checksum",
            Rule::RepeatedDigits => "repeated_digits",
            Rule::AreaCode => "area_code",
            Rule::TooShort => "too_short",
            Rule::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {rule}")]
pub struct ValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// Rule that was broken
    pub rule: Rule,
}

impl ValidationError {
    pub fn new(field: &'static str, rule: Rule) -> Self {
        Self { field, rule }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, Rule::Required)
    }

    pub fn format(field: &'static str) -> Self {
        Self::new(field, Rule::Format)
    }
}

/// Keeps only ASCII digits
pub(crate) fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Trims and rejects blank input
pub(crate) fn required_text(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(trimmed.to_string())
}
