//! Pre-built Test Fixtures
//!
//! Identity values that are known to pass (or fail) validation, plus fixed
//! timestamps for period queries.

use chrono::{DateTime, TimeZone, Utc};

/// Fixture for vehicle identity values
pub struct VehicleFixtures;

impl VehicleFixtures {
    /// Legacy layout plate
    pub fn legacy_plate() -> &'static str {
        "ABC1234"
    }

    /// Mercosul layout plate
    pub fn mercosul_plate() -> &'static str {
        "BRA2E19"
    }

    pub fn renavam() -> &'static str {
        "12345678901"
    }

    pub fn other_renavam() -> &'static str {
        "98765432109"
    }

    /// Plates that must be rejected
    pub fn invalid_plates() -> Vec<&'static str> {
        vec!["", "AB1234", "ABCD123", "1234ABC", "ABC12345", "ABC1D2E"]
    }
}

/// Fixture for driver identity values
pub struct DriverFixtures;

impl DriverFixtures {
    /// CNHs with correct check digits
    pub fn valid_cnhs() -> Vec<&'static str> {
        vec!["12345678900", "00000000119", "11111111220", "52998224752", "00000005005"]
    }

    /// CNHs with a corrupted check digit or another defect
    pub fn invalid_cnhs() -> Vec<&'static str> {
        vec![
            "12345678901",
            "52998224753",
            "62998224752",
            "98765432100",
            "00000000000",
            "1234567890",
            "1234567890a",
        ]
    }

    pub fn phone() -> &'static str {
        "(11) 98765-4321"
    }

    pub fn email() -> &'static str {
        "motorista@frota.com.br"
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn march_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    pub fn march_last() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap()
    }
}
