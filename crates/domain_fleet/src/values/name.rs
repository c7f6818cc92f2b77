use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Rule, ValidationError};

const MIN_LEN: usize = 2;

/// A person's first and last name
///
/// Both parts are trimmed and must have at least two characters.
/// Comparison ignores case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NameParts")]
pub struct Name {
    first_name: String,
    last_name: String,
}

#[derive(Deserialize)]
struct NameParts {
    first_name: String,
    last_name: String,
}

impl Name {
    pub fn new(first_name: &str, last_name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: part("first_name", first_name)?,
            last_name: part("last_name", last_name)?,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn part(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    if trimmed.chars().count() < MIN_LEN {
        return Err(ValidationError::new(field, Rule::TooShort));
    }
    Ok(trimmed.to_string())
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.first_name.to_lowercase() == other.first_name.to_lowercase()
            && self.last_name.to_lowercase() == other.last_name.to_lowercase()
    }
}

impl Eq for Name {}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

impl TryFrom<NameParts> for Name {
    type Error = ValidationError;

    fn try_from(parts: NameParts) -> Result<Self, Self::Error> {
        Self::new(&parts.first_name, &parts.last_name)
    }
}
