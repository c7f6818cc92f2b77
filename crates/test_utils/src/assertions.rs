//! Custom Test Assertions
//!
//! Assertion helpers for fleet results that print the actual error on
//! mismatch.

use std::fmt::Debug;

use domain_fleet::{CarStatus, ErrorKind, FleetError, FleetResult};

/// Asserts that a result failed with the given error kind
///
/// # Panics
///
/// Panics if the result is `Ok` or fails with another kind
pub fn assert_error_kind<T: Debug>(result: &FleetResult<T>, expected: ErrorKind) {
    match result {
        Ok(value) => panic!("Expected {:?} error, got Ok({:?})", expected, value),
        Err(err) => assert_eq!(
            err.kind(),
            expected,
            "Expected {:?} error, got {:?}",
            expected,
            err
        ),
    }
}

/// Asserts that a result failed and the error matches a predicate
pub fn assert_fleet_error<T: Debug>(
    result: FleetResult<T>,
    matches: impl FnOnce(&FleetError) -> bool,
) {
    match result {
        Ok(value) => panic!("Expected an error, got Ok({:?})", value),
        Err(err) => assert!(matches(&err), "Unexpected error: {:?}", err),
    }
}

/// Asserts a car status
pub fn assert_car_status(actual: CarStatus, expected: CarStatus) {
    assert_eq!(
        actual, expected,
        "Car status mismatch: actual={}, expected={}",
        actual, expected
    );
}
