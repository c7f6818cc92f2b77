use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Rule, ValidationError};

const FIELD: &str = "license_plate";

/// Vehicle license plate
///
/// Accepts the legacy `AAA9999` layout and the Mercosul `AAA9A99` layout.
/// Separators and other non-alphanumeric characters are stripped and the
/// result is uppercased before validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicensePlate(String);

impl LicensePlate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.is_empty() {
            return Err(ValidationError::required(FIELD));
        }

        let bytes = normalized.as_bytes();
        let valid = bytes.len() == 7
            && bytes[..3].iter().all(u8::is_ascii_alphabetic)
            && bytes[3].is_ascii_digit()
            && bytes[4].is_ascii_alphanumeric()
            && bytes[5..].iter().all(u8::is_ascii_digit);

        if !valid {
            return Err(ValidationError::new(FIELD, Rule::Format));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the `AAA9A99` layout
    pub fn is_mercosul(&self) -> bool {
        self.0.as_bytes()[4].is_ascii_alphabetic()
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LicensePlate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LicensePlate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LicensePlate> for String {
    fn from(plate: LicensePlate) -> String {
        plate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_plate_normalized() {
        let plate = LicensePlate::parse("abc-1234").unwrap();
        assert_eq!(plate.as_str(), "ABC1234");
        assert!(!plate.is_mercosul());
    }

    #[test]
    fn test_mercosul_plate() {
        let plate = LicensePlate::parse("BRA 2E19").unwrap();
        assert_eq!(plate.as_str(), "BRA2E19");
        assert!(plate.is_mercosul());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        for input in ["AB12345", "ABC12345", "1BC1234", "ABCD123", "ABC12E4"] {
            assert_eq!(
                LicensePlate::parse(input),
                Err(ValidationError::new(FIELD, Rule::Format)),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(LicensePlate::parse(" - "), Err(ValidationError::required(FIELD)));
    }
}
