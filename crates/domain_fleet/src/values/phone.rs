use serde::{Deserialize, Serialize};
use std::fmt;

use super::{digits_only, Rule, ValidationError};

const FIELD: &str = "phone";

/// Mobile phone number: two-digit area code followed by nine digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let digits = digits_only(input);
        if digits.is_empty() {
            return Err(ValidationError::required(FIELD));
        }
        if digits.len() != 11 {
            return Err(ValidationError::new(FIELD, Rule::Format));
        }

        let bytes = digits.as_bytes();
        let area = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
        if bytes[0] == b'0' || !(11..=99).contains(&area) {
            return Err(ValidationError::new(FIELD, Rule::AreaCode));
        }
        if !(b'2'..=b'9').contains(&bytes[2]) {
            return Err(ValidationError::new(FIELD, Rule::Format));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn area_code(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> String {
        phone.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting() {
        let phone = Phone::parse("(11) 98765-4321").unwrap();
        assert_eq!(phone.as_str(), "11987654321");
        assert_eq!(phone.area_code(), "11");
    }

    #[test]
    fn test_area_code_range() {
        assert_eq!(
            Phone::parse("10987654321"),
            Err(ValidationError::new(FIELD, Rule::AreaCode))
        );
        assert_eq!(
            Phone::parse("09987654321"),
            Err(ValidationError::new(FIELD, Rule::AreaCode))
        );
        assert!(Phone::parse("99987654321").is_ok());
    }

    #[test]
    fn test_third_digit_must_be_two_to_nine() {
        assert!(Phone::parse("11187654321").is_err());
        assert!(Phone::parse("11087654321").is_err());
        assert!(Phone::parse("11287654321").is_ok());
    }
}
