//! Tests for the value objects

use proptest::prelude::*;

use domain_fleet::values::{Cnh, Email, LicensePlate, Phone, Renavam, Rule, ValidationError};
use test_utils::{
    legacy_plate_strategy, mercosul_plate_strategy, phone_strategy, renavam_strategy,
    valid_cnh_strategy, DriverFixtures, VehicleFixtures,
};

// ============================================================================
// CNH
// ============================================================================

mod cnh_tests {
    use super::*;

    #[test]
    fn test_fixture_cnhs_are_valid() {
        for cnh in DriverFixtures::valid_cnhs() {
            assert!(Cnh::parse(cnh).is_ok(), "{cnh} should be valid");
        }
    }

    #[test]
    fn test_fixture_cnhs_are_invalid() {
        for cnh in DriverFixtures::invalid_cnhs() {
            assert!(Cnh::parse(cnh).is_err(), "{cnh} should be invalid");
        }
    }

    #[test]
    fn test_payload_corruption_detected() {
        let err = Cnh::parse("62998224752").unwrap_err();
        assert_eq!(err, ValidationError::new("cnh", Rule::Checksum));
    }

    #[test]
    fn test_serde_goes_through_validation() {
        let ok: Cnh = serde_json::from_str("\"52998224752\"").unwrap();
        assert_eq!(ok.as_str(), "52998224752");
        assert!(serde_json::from_str::<Cnh>("\"52998224753\"").is_err());
    }
}

// ============================================================================
// License plate and renavam
// ============================================================================

mod vehicle_identity_tests {
    use super::*;

    #[test]
    fn test_fixture_plates() {
        assert!(LicensePlate::parse(VehicleFixtures::legacy_plate()).is_ok());
        assert!(LicensePlate::parse(VehicleFixtures::mercosul_plate()).unwrap().is_mercosul());
        for plate in VehicleFixtures::invalid_plates() {
            assert!(LicensePlate::parse(plate).is_err(), "{plate:?} should be invalid");
        }
    }

    #[test]
    fn test_plate_equality_after_normalization() {
        assert_eq!(
            LicensePlate::parse("abc-1234").unwrap(),
            LicensePlate::parse("ABC 1234").unwrap()
        );
    }

    #[test]
    fn test_renavam_serde() {
        let renavam: Renavam = serde_json::from_str("\"12345678901\"").unwrap();
        assert_eq!(serde_json::to_string(&renavam).unwrap(), "\"12345678901\"");
        assert!(serde_json::from_str::<Renavam>("\"123\"").is_err());
    }
}

// ============================================================================
// Contact values
// ============================================================================

mod contact_tests {
    use super::*;

    #[test]
    fn test_phone_fixture() {
        assert_eq!(Phone::parse(DriverFixtures::phone()).unwrap().as_str(), "11987654321");
    }

    #[test]
    fn test_email_equality_is_normalized() {
        assert_eq!(
            Email::parse(DriverFixtures::email()).unwrap(),
            Email::parse("  MOTORISTA@FROTA.COM.BR").unwrap()
        );
    }
}

// ============================================================================
// Property-based tests
// ============================================================================

proptest! {
    #[test]
    fn prop_generated_cnh_is_valid(cnh in valid_cnh_strategy()) {
        prop_assert!(Cnh::parse(&cnh).is_ok());
    }

    #[test]
    fn prop_corrupted_check_digit_is_rejected(
        cnh in valid_cnh_strategy(),
        position in 9usize..11,
        shift in 1u8..10,
    ) {
        let mut digits: Vec<u8> = cnh.bytes().map(|b| b - b'0').collect();
        digits[position] = (digits[position] + shift) % 10;
        let corrupted: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
        prop_assert!(Cnh::parse(&corrupted).is_err());
    }

    #[test]
    fn prop_legacy_plates_parse(plate in legacy_plate_strategy()) {
        let parsed = LicensePlate::parse(&plate.to_lowercase()).unwrap();
        prop_assert_eq!(parsed.as_str(), plate.as_str());
        prop_assert!(!parsed.is_mercosul());
    }

    #[test]
    fn prop_mercosul_plates_parse(plate in mercosul_plate_strategy()) {
        prop_assert!(LicensePlate::parse(&plate).unwrap().is_mercosul());
    }

    #[test]
    fn prop_other_plate_shapes_fail(plate in "[A-Z0-9]{7}") {
        let b = plate.as_bytes();
        let well_formed = b[..3].iter().all(u8::is_ascii_alphabetic)
            && b[3].is_ascii_digit()
            && b[5..].iter().all(u8::is_ascii_digit);
        prop_assert_eq!(LicensePlate::parse(&plate).is_ok(), well_formed);
    }

    #[test]
    fn prop_renavams_parse(renavam in renavam_strategy()) {
        prop_assert!(Renavam::parse(&renavam).is_ok());
    }

    #[test]
    fn prop_phones_parse(phone in phone_strategy()) {
        prop_assert!(Phone::parse(&phone).is_ok());
    }
}
