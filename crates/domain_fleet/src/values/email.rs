use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

use super::{Rule, ValidationError};

const FIELD: &str = "email";

/// Lowercased e-mail address with a dotted domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::required(FIELD));
        }
        if !normalized.validate_email() || !has_dotted_domain(&normalized) {
            return Err(ValidationError::new(FIELD, Rule::Format));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// `validator` accepts bare hosts such as `user@localhost`.
fn has_dotted_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && !tld.is_empty() && host.split('.').all(|l| !l.is_empty())
        }
        None => false,
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> String {
        email.0
    }
}
