//! Tests for CarService

use domain_fleet::services::UpdateCarRequest;
use domain_fleet::{CarStatus, ErrorKind, FleetError, FleetEvent, OdometerViolation, Resource};
use test_utils::{
    assert_car_status, assert_error_kind, assert_fleet_error, CarRequestBuilder, TestFleet,
    VehicleFixtures,
};

// ============================================================================
// Registration
// ============================================================================

mod create_car_tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_available_active_car() {
        let fleet = TestFleet::new();
        let events = fleet.subscribe();

        let car = fleet
            .cars
            .create_car(CarRequestBuilder::new().with_plate("abc-1d23").build())
            .await
            .unwrap();

        assert_car_status(car.status(), CarStatus::Available);
        assert!(car.is_active());
        assert_eq!(car.license_plate().as_str(), "ABC1D23");

        let published = events.drain();
        assert!(matches!(
            published.as_slice(),
            [FleetEvent::CarRegistered { car_id, .. }] if *car_id == car.id()
        ));
    }

    #[tokio::test]
    async fn test_duplicate_renavam_is_checked_before_plate() {
        let fleet = TestFleet::new();
        fleet
            .cars
            .create_car(
                CarRequestBuilder::new()
                    .with_plate(VehicleFixtures::legacy_plate())
                    .with_renavam(VehicleFixtures::renavam())
                    .build(),
            )
            .await
            .unwrap();

        // both keys clash; renavam wins
        let result = fleet
            .cars
            .create_car(
                CarRequestBuilder::new()
                    .with_plate(VehicleFixtures::legacy_plate())
                    .with_renavam(VehicleFixtures::renavam())
                    .build(),
            )
            .await;

        assert_fleet_error(result, |e| matches!(e, FleetError::RenavamAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_invalid_plate_is_bad_request() {
        let fleet = TestFleet::new();
        let result = fleet
            .cars
            .create_car(CarRequestBuilder::new().with_plate("AB-12").build())
            .await;

        assert_error_kind(&result, ErrorKind::BadRequest);
    }
}

// ============================================================================
// Updates
// ============================================================================

mod update_car_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_car_is_resource_not_found() {
        let fleet = TestFleet::new();
        let result = fleet
            .cars
            .update_car(core_kernel::CarId::new(), UpdateCarRequest::default())
            .await;

        assert_fleet_error(result, |e| {
            matches!(e, FleetError::ResourceNotFound { resource: Resource::Car, .. })
        });
    }

    #[tokio::test]
    async fn test_plate_clash_with_other_car() {
        let fleet = TestFleet::new();
        let first = fleet.car_with_odometer(1000).await;
        let second = fleet.car_with_odometer(1000).await;

        let result = fleet
            .cars
            .update_car(
                second.id(),
                UpdateCarRequest {
                    license_plate: Some(first.license_plate().to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_fleet_error(result, |e| matches!(e, FleetError::LicensePlateAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_resubmitting_own_plate_is_allowed() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(1000).await;

        let updated = fleet
            .cars
            .update_car(
                car.id(),
                UpdateCarRequest {
                    license_plate: Some(car.license_plate().to_string()),
                    renavam: Some(car.renavam().to_string()),
                    color: Some("Azul".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.color(), "Azul");
        assert!(updated.updated_at().is_some());
    }

    #[tokio::test]
    async fn test_odometer_decrease_rejected() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(5000).await;

        let result = fleet
            .cars
            .update_car(
                car.id(),
                UpdateCarRequest {
                    odometer: Some(4999),
                    ..Default::default()
                },
            )
            .await;

        assert_fleet_error(result, |e| {
            matches!(
                e,
                FleetError::InvalidOdometer {
                    current: 5000,
                    proposed: 4999,
                    violation: OdometerViolation::Decrease
                }
            )
        });
        assert_eq!(fleet.cars.get_car(car.id()).await.unwrap().odometer(), 5000);
    }
}

// ============================================================================
// Deletion and inactivation
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_unused_car() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(1000).await;

        fleet.cars.delete_car(car.id()).await.unwrap();

        assert_error_kind(&fleet.cars.get_car(car.id()).await, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_closed_event() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(1000).await;
        let driver = fleet.driver().await;
        let event = fleet.checkout(&car, &driver, 1000).await.unwrap();
        fleet.usage.finalize_event(event.id(), 1050).await.unwrap();

        let result = fleet.cars.delete_car(car.id()).await;
        assert_fleet_error(result, |e| {
            matches!(e, FleetError::CarHasEvents(id) if *id == car.id())
        });
    }

    #[tokio::test]
    async fn test_inactivate_only_blocked_by_open_event() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(1000).await;
        let driver = fleet.driver().await;
        let event = fleet.checkout(&car, &driver, 1000).await.unwrap();

        assert_fleet_error(fleet.cars.inactivate_car(car.id()).await, |e| {
            matches!(e, FleetError::CarHasEvents(_))
        });

        fleet.usage.finalize_event(event.id(), 1000).await.unwrap();
        let inactive = fleet.cars.inactivate_car(car.id()).await.unwrap();
        assert!(!inactive.is_active());
        assert!(inactive.inactive_at().is_some());
    }

    #[tokio::test]
    async fn test_inactivating_twice_keeps_first_timestamp() {
        let fleet = TestFleet::new();
        let car = fleet.car_with_odometer(1000).await;

        let first = fleet.cars.inactivate_car(car.id()).await.unwrap();
        let second = fleet.cars.inactivate_car(car.id()).await.unwrap();

        assert_eq!(first.inactive_at(), second.inactive_at());
    }
}

// ============================================================================
// Queries
// ============================================================================

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_list_is_not_found() {
        let fleet = TestFleet::new();
        assert_fleet_error(fleet.cars.list_cars().await, |e| {
            matches!(e, FleetError::NotFound(Resource::Car))
        });
    }

    #[tokio::test]
    async fn test_list_in_registration_order() {
        let fleet = TestFleet::new();
        let first = fleet.car_with_odometer(10).await;
        let second = fleet.car_with_odometer(20).await;

        let ids: Vec<_> = fleet.cars.list_cars().await.unwrap().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
    }

    #[tokio::test]
    async fn test_lookup_by_plate_normalizes_input() {
        let fleet = TestFleet::new();
        let car = fleet
            .cars
            .create_car(CarRequestBuilder::new().with_plate("BRA2E19").build())
            .await
            .unwrap();

        let found = fleet.cars.get_car_by_license_plate("bra-2e19").await.unwrap();
        assert_eq!(found.id(), car.id());

        assert_error_kind(
            &fleet.cars.get_car_by_license_plate("XYZ9999").await,
            ErrorKind::NotFound,
        );
    }
}
