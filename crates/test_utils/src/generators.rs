//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating identity values that
//! satisfy the fleet validation rules.

use proptest::prelude::*;

/// Completes a 9-digit payload with its CNH check digits.
///
/// Returns `None` for payloads that cannot form a valid CNH: all digits
/// equal, or a second check digit that would be negative.
pub fn complete_cnh(payload: &[u8; 9]) -> Option<String> {
    let first: i32 = payload
        .iter()
        .enumerate()
        .map(|(i, d)| i32::from(*d) * (9 - i as i32))
        .sum();
    let (dv1, borrow) = match first % 11 {
        r if r >= 10 => (0, 2),
        r => (r, 0),
    };

    let second: i32 = payload
        .iter()
        .enumerate()
        .map(|(i, d)| i32::from(*d) * (i as i32 + 1))
        .sum();
    let dv2 = match second % 11 {
        r if r >= 10 => 0,
        r => r - borrow,
    };
    if dv2 < 0 {
        return None;
    }

    let mut digits: Vec<u8> = payload.to_vec();
    digits.push(dv1 as u8);
    digits.push(dv2 as u8);
    if digits.iter().all(|d| *d == digits[0]) {
        return None;
    }
    Some(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

/// Strategy for generating valid CNH numbers
pub fn valid_cnh_strategy() -> impl Strategy<Value = String> {
    prop::array::uniform9(0u8..10).prop_filter_map("payload has no valid CNH", |payload| {
        complete_cnh(&payload)
    })
}

/// Strategy for generating legacy `AAA9999` plates
pub fn legacy_plate_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{3}[0-9]{4}"
}

/// Strategy for generating Mercosul `AAA9A99` plates
pub fn mercosul_plate_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{3}[0-9][A-Z][0-9]{2}"
}

/// Strategy for generating plates of either layout
pub fn plate_strategy() -> impl Strategy<Value = String> {
    prop_oneof![legacy_plate_strategy(), mercosul_plate_strategy()]
}

/// Strategy for generating renavam numbers
pub fn renavam_strategy() -> impl Strategy<Value = String> {
    "[0-9]{11}"
}

/// Strategy for generating mobile phone numbers
pub fn phone_strategy() -> impl Strategy<Value = String> {
    (11u32..100, 2u32..10, 0u32..100_000_000)
        .prop_map(|(area, third, rest)| format!("{area}{third}{rest:08}"))
}

/// Strategy for a current odometer reading and an accepted next reading
pub fn accepted_odometer_strategy() -> impl Strategy<Value = (u64, u64)> {
    (0u64..10_000_000).prop_flat_map(|current| {
        let max = current + current / 10;
        (Just(current), current..=max)
    })
}
