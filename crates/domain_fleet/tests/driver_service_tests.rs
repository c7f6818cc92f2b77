//! Tests for DriverService

use domain_fleet::services::UpdateDriverProfileRequest;
use domain_fleet::{ErrorKind, FleetError, LicenseCategory, Resource};
use test_utils::{assert_error_kind, assert_fleet_error, DriverRequestBuilder, TestFleet};

mod register_driver_tests {
    use super::*;

    #[tokio::test]
    async fn test_registers_active_driver() {
        let fleet = TestFleet::new();
        let driver = fleet
            .drivers
            .register_driver(
                DriverRequestBuilder::new()
                    .with_name("  Maria ", "Oliveira")
                    .with_phone("(21) 99876-5432")
                    .with_cnh_type("d")
                    .build(),
            )
            .await
            .unwrap();

        assert!(driver.is_active());
        assert_eq!(driver.name().first_name(), "Maria");
        assert_eq!(driver.phone().as_str(), "21998765432");
        assert_eq!(driver.cnh_type(), LicenseCategory::D);
    }

    #[tokio::test]
    async fn test_uniqueness_order_is_email_phone_cnh() {
        let fleet = TestFleet::new();
        let existing = fleet.driver().await;

        let all_clash = DriverRequestBuilder::new()
            .with_email(existing.email().as_str())
            .with_phone(existing.phone().as_str())
            .with_cnh(existing.cnh().as_str())
            .build();
        assert_fleet_error(fleet.drivers.register_driver(all_clash).await, |e| {
            matches!(e, FleetError::EmailAlreadyExists(_))
        });

        let phone_and_cnh = DriverRequestBuilder::new()
            .with_phone(existing.phone().as_str())
            .with_cnh(existing.cnh().as_str())
            .build();
        assert_fleet_error(fleet.drivers.register_driver(phone_and_cnh).await, |e| {
            matches!(e, FleetError::PhoneAlreadyExists(_))
        });

        let cnh_only = DriverRequestBuilder::new().with_cnh(existing.cnh().as_str()).build();
        assert_fleet_error(fleet.drivers.register_driver(cnh_only).await, |e| {
            matches!(e, FleetError::CnhAlreadyExists(_))
        });
    }

    #[tokio::test]
    async fn test_invalid_cnh_is_bad_request() {
        let fleet = TestFleet::new();
        let result = fleet
            .drivers
            .register_driver(DriverRequestBuilder::new().with_cnh("12345678901").build())
            .await;
        assert_error_kind(&result, ErrorKind::BadRequest);
    }
}

// ============================================================================
// Profile updates
// ============================================================================

mod update_profile_tests {
    use super::*;

    #[tokio::test]
    async fn test_same_email_leaves_driver_unchanged() {
        let fleet = TestFleet::new();
        let driver = fleet.driver().await;

        let result = fleet
            .drivers
            .update_driver_profile(
                driver.id(),
                UpdateDriverProfileRequest {
                    email: Some(driver.email().as_str().to_uppercase()),
                    first_name: Some("Changed".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_fleet_error(result, |e| matches!(e, FleetError::SameEmail));
        let stored = fleet.drivers.get_driver_profile(driver.id()).await.unwrap();
        assert_eq!(stored, driver);
        assert!(stored.updated_at().is_none());
    }

    #[tokio::test]
    async fn test_same_phone_leaves_driver_unchanged() {
        let fleet = TestFleet::new();
        let driver = fleet.driver().await;

        let result = fleet
            .drivers
            .update_driver_profile(
                driver.id(),
                UpdateDriverProfileRequest {
                    phone: Some(driver.phone().to_string()),
                    last_name: Some("Trocado".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_fleet_error(result, |e| matches!(e, FleetError::SamePhone));
        let stored = fleet.drivers.get_driver_profile(driver.id()).await.unwrap();
        assert_eq!(stored, driver);
        assert!(stored.updated_at().is_none());
    }

    #[tokio::test]
    async fn test_same_phone_and_cnh() {
        let fleet = TestFleet::new();
        let driver = fleet.driver().await;

        let phone = fleet
            .drivers
            .update_driver_profile(
                driver.id(),
                UpdateDriverProfileRequest {
                    phone: Some(driver.phone().to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert_error_kind(&phone, ErrorKind::SameValueAsCurrent);

        let cnh = fleet
            .drivers
            .update_driver_profile(
                driver.id(),
                UpdateDriverProfileRequest {
                    cnh: Some(driver.cnh().to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert_fleet_error(cnh, |e| matches!(e, FleetError::SameCnh));
    }

    #[tokio::test]
    async fn test_email_of_other_driver_rejected() {
        let fleet = TestFleet::new();
        let first = fleet.driver().await;
        let second = fleet.driver().await;

        let result = fleet
            .drivers
            .update_driver_profile(
                second.id(),
                UpdateDriverProfileRequest {
                    email: Some(first.email().to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_fleet_error(result, |e| matches!(e, FleetError::EmailAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_partial_address_is_ignored() {
        let fleet = TestFleet::new();
        let driver = fleet.driver().await;

        let updated = fleet
            .drivers
            .update_driver_profile(
                driver.id(),
                UpdateDriverProfileRequest {
                    street: Some("Rua Nova".to_string()),
                    city: Some("Campinas".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.address(), driver.address());
    }

    #[tokio::test]
    async fn test_full_address_replaces() {
        let fleet = TestFleet::new();
        let driver = fleet.driver().await;

        let updated = fleet
            .drivers
            .update_driver_profile(
                driver.id(),
                UpdateDriverProfileRequest {
                    street: Some("Rua Nova".to_string()),
                    number: Some(42),
                    district: Some("Centro".to_string()),
                    zip_code: Some("13010-000".to_string()),
                    city: Some("Campinas".to_string()),
                    state: Some("SP".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.address().city(), "Campinas");
        assert_eq!(updated.address().zip_code(), "13010000");
    }

    #[tokio::test]
    async fn test_last_name_merged_with_current_first_name() {
        let fleet = TestFleet::new();
        let driver = fleet
            .drivers
            .register_driver(DriverRequestBuilder::new().with_name("Carlos", "Pereira").build())
            .await
            .unwrap();

        let updated = fleet
            .drivers
            .update_driver_profile(
                driver.id(),
                UpdateDriverProfileRequest {
                    last_name: Some("Andrade".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name().full_name(), "Carlos Andrade");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_inactivate_blocked_by_open_event() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(1000).await;
        let driver = fleet.driver().await;
        let event = fleet.checkout(&car, &driver, 1000).await.unwrap();

        assert_fleet_error(fleet.drivers.inactivate_driver(driver.id()).await, |e| {
            matches!(e, FleetError::DriverHasOpenEvent(_))
        });

        fleet.usage.finalize_event(event.id(), 1010).await.unwrap();
        assert!(!fleet.drivers.inactivate_driver(driver.id()).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_any_event() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(1000).await;
        let driver = fleet.driver().await;
        let event = fleet.checkout(&car, &driver, 1000).await.unwrap();
        fleet.usage.finalize_event(event.id(), 1010).await.unwrap();

        assert_fleet_error(fleet.drivers.delete_driver(driver.id()).await, |e| {
            matches!(e, FleetError::DriverHasEvents(_))
        });
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let fleet = TestFleet::new();
        let driver = fleet.driver().await;
        assert_eq!(fleet.drivers.list_drivers().await.unwrap().len(), 1);

        fleet.drivers.delete_driver(driver.id()).await.unwrap();

        assert_fleet_error(fleet.drivers.list_drivers().await, |e| {
            matches!(e, FleetError::NotFound(Resource::Driver))
        });
        assert_error_kind(
            &fleet.drivers.get_driver_profile(driver.id()).await,
            ErrorKind::NotFound,
        );
    }
}
