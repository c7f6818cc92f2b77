//! Odometer validation policy
//!
//! Limits how far the odometer may advance within one usage cycle. The
//! comparison is done in integer arithmetic so the boundary is exact:
//! with the default 10% a car at 1000 km accepts 1100 and rejects 1101.

use serde::{Deserialize, Serialize};

/// Default maximum increase, in percent of the current reading
pub const DEFAULT_MAX_INCREASE_PERCENT: u32 = 10;

/// Why a proposed reading was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OdometerViolation {
    /// The proposed reading is lower than the current one
    Decrease,
    /// The proposed reading advances more than the policy allows
    ExcessiveIncrease,
}

/// Configurable odometer policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdometerPolicy {
    max_increase_percent: u32,
}

impl OdometerPolicy {
    pub fn new(max_increase_percent: u32) -> Self {
        Self { max_increase_percent }
    }

    pub fn max_increase_percent(&self) -> u32 {
        self.max_increase_percent
    }

    /// Checks a proposed reading against the current one
    pub fn check(&self, current: u64, proposed: u64) -> Result<(), OdometerViolation> {
        if proposed < current {
            return Err(OdometerViolation::Decrease);
        }
        if proposed == current {
            return Ok(());
        }

        let limit = u128::from(current) * (100 + u128::from(self.max_increase_percent));
        if u128::from(proposed) * 100 <= limit {
            Ok(())
        } else {
            Err(OdometerViolation::ExcessiveIncrease)
        }
    }

    pub fn validate(&self, current: u64, proposed: u64) -> bool {
        self.check(current, proposed).is_ok()
    }
}

impl Default for OdometerPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INCREASE_PERCENT)
    }
}

/// Validates a reading with the default policy
pub fn validate(current: u64, proposed: u64) -> bool {
    OdometerPolicy::default().validate(current, proposed)
}
