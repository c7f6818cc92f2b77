use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Rule, ValidationError};

const FIELD: &str = "cnh";

/// Driver's license number (CNH)
///
/// Eleven digits; the last two are modulo-11 check digits over the first
/// nine. When the first check digit overflows to 0, a borrow of 2 is
/// subtracted from the second one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnh(String);

impl Cnh {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::required(FIELD));
        }
        if trimmed.len() != 11 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new(FIELD, Rule::Format));
        }

        let digits: Vec<i32> = trimmed.bytes().map(|b| i32::from(b - b'0')).collect();
        if digits.iter().all(|d| *d == digits[0]) {
            return Err(ValidationError::new(FIELD, Rule::RepeatedDigits));
        }

        let (dv1, dv2) = check_digits(&digits[..9]);
        if dv1 != digits[9] || dv2 != digits[10] {
            return Err(ValidationError::new(FIELD, Rule::Checksum));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Computes both check digits for a 9-digit payload.
///
/// The second digit may come out negative, which no input digit can match.
fn check_digits(payload: &[i32]) -> (i32, i32) {
    let first_sum: i32 = payload
        .iter()
        .enumerate()
        .map(|(i, d)| d * (9 - i as i32))
        .sum();

    let mut dv1 = first_sum % 11;
    let mut borrow = 0;
    if dv1 >= 10 {
        dv1 = 0;
        borrow = 2;
    }

    let second_sum: i32 = payload
        .iter()
        .enumerate()
        .map(|(i, d)| d * (i as i32 + 1))
        .sum();

    let rem = second_sum % 11;
    let dv2 = if rem >= 10 { 0 } else { rem - borrow };

    (dv1, dv2)
}

impl fmt::Display for Cnh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Cnh {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cnh> for String {
    fn from(cnh: Cnh) -> String {
        cnh.0
    }
}
