use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Rule, ValidationError};

const FIELD: &str = "renavam";

/// National vehicle registry number: exactly 11 digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Renavam(String);

impl Renavam {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::required(FIELD));
        }
        if trimmed.len() != 11 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new(FIELD, Rule::Format));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Renavam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Renavam {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Renavam> for String {
    fn from(renavam: Renavam) -> String {
        renavam.0
    }
}
