//! End-to-end usage scenarios over the in-memory store

use domain_fleet::i18n::translator;
use domain_fleet::services::UpdateDriverProfileRequest;
use domain_fleet::{CarStatus, ErrorKind, FleetError, FleetEvent};
use test_utils::{
    assert_car_status, assert_error_kind, assert_fleet_error, CarRequestBuilder, DriverFixtures,
    TestFleet, VehicleFixtures,
};

#[tokio::test]
async fn test_full_usage_cycle() {
    let fleet = TestFleet::new();
    let subscription = fleet.subscribe();
    let car = fleet.car_with_odometer(1000).await;
    let driver = fleet.driver().await;
    let other_driver = fleet.driver().await;

    // Checkout at 1050
    let event = fleet.checkout(&car, &driver, 1050).await.unwrap();
    assert_car_status(fleet.cars.get_car(car.id()).await.unwrap().status(), CarStatus::InUse);

    // The car cannot leave twice
    let second = fleet.checkout(&car, &other_driver, 1050).await;
    assert_fleet_error(second, |e| matches!(e, FleetError::CarInUse(id) if *id == car.id()));

    // 1200 is more than 10% above the checkout reading
    let rejected = fleet.usage.finalize_event(event.id(), 1200).await;
    let error = rejected.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidOdometer);
    let en = translator("en-US").unwrap();
    assert_eq!(
        error.localize(&en),
        "The odometer reading 1200 is too high compared to 1050."
    );

    // 1090 is accepted
    let finalized = fleet.usage.finalize_event(event.id(), 1090).await.unwrap();
    assert!(!finalized.is_open());

    let stored = fleet.cars.get_car(car.id()).await.unwrap();
    assert_eq!(stored.odometer(), 1090);
    assert_car_status(stored.status(), CarStatus::Available);

    let types: Vec<_> = subscription.drain().iter().map(FleetEvent::event_type).collect();
    assert_eq!(
        types,
        vec![
            "CarRegistered",
            "DriverRegistered",
            "DriverRegistered",
            "VehicleCheckedOut",
            "VehicleCheckedIn",
        ]
    );
}

#[tokio::test]
async fn test_duplicate_identity_values() {
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

    // Renavam is checked before the plate
    let both = fleet
        .cars
        .create_car(
            CarRequestBuilder::new()
                .with_plate(VehicleFixtures::legacy_plate())
                .with_renavam(VehicleFixtures::renavam())
                .build(),
        )
        .await;
    assert_fleet_error(both, |e| matches!(e, FleetError::RenavamAlreadyExists(_)));

    let plate_only = fleet
        .cars
        .create_car(
            CarRequestBuilder::new()
                .with_plate(VehicleFixtures::legacy_plate().to_lowercase())
                .with_renavam(VehicleFixtures::other_renavam())
                .build(),
        )
        .await;
    assert_fleet_error(plate_only, |e| matches!(e, FleetError::LicensePlateAlreadyExists(_)));
}

#[tokio::test]
async fn test_resubmitting_current_email() {
    let fleet = TestFleet::new();
    let driver = fleet
        .drivers
        .register_driver(
            test_utils::DriverRequestBuilder::new()
                .with_email(DriverFixtures::email())
                .build(),
        )
        .await
        .unwrap();

    let result = fleet
        .drivers
        .update_driver_profile(
            driver.id(),
            UpdateDriverProfileRequest {
                email: Some(DriverFixtures::email().to_string()),
                ..Default::default()
            },
        )
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SameValueAsCurrent);
    let pt = translator("pt-BR").unwrap();
    assert_eq!(error.localize(&pt), "O novo e-mail é igual ao atual.");
}

#[tokio::test]
async fn test_cancelled_checkout_leaves_no_trace() {
    let fleet = TestFleet::new();
    let car = fleet.car_with_odometer(1000).await;
    let driver = fleet.driver().await;

    let event = fleet.checkout(&car, &driver, 1020).await.unwrap();
    fleet.usage.delete_event(event.id()).await.unwrap();

    assert_error_kind(&fleet.reports.list_events_by_car(car.id()).await, ErrorKind::NotFound);
    fleet.drivers.delete_driver(driver.id()).await.unwrap();
    fleet.cars.delete_car(car.id()).await.unwrap();
    assert_eq!(fleet.store.counts().await, (0, 0, 0));
}
