//! Tests for the in-memory application context

use core_kernel::AdapterHealth;
use domain_fleet::FleetError;
use fleet_app::{AppConfig, FleetContext, StoreHandle, StoreKind};
use test_utils::{CarRequestBuilder, DriverRequestBuilder, VehicleFixtures};

fn memory_config(locale: &str) -> AppConfig {
    AppConfig {
        store: StoreKind::Memory,
        locale: locale.to_string(),
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_memory_context_reports_counts() {
    let context = FleetContext::from_config(&memory_config("pt-BR")).await.unwrap();
    assert!(matches!(context.store(), StoreHandle::Memory(_)));

    context.cars.create_car(CarRequestBuilder::new().build()).await.unwrap();
    context
        .drivers
        .register_driver(DriverRequestBuilder::new().build())
        .await
        .unwrap();

    let report = context.status().await.unwrap();
    assert_eq!(report.health.status, AdapterHealth::Healthy);
    assert_eq!((report.cars, report.drivers, report.events), (1, 1, 0));
    assert_eq!(report.locale, "pt-BR");
    assert_eq!(report.timezone, "America/Sao_Paulo");
    assert_eq!(report.odometer_max_increase_percent, 10);
}

#[tokio::test]
async fn test_errors_are_localized() {
    let context = FleetContext::in_memory(&memory_config("en-US")).unwrap();
    context
        .cars
        .create_car(CarRequestBuilder::new().with_plate(VehicleFixtures::legacy_plate()).build())
        .await
        .unwrap();

    let error = context
        .cars
        .create_car(CarRequestBuilder::new().with_plate(VehicleFixtures::legacy_plate()).build())
        .await
        .unwrap_err();

    assert!(matches!(error, FleetError::LicensePlateAlreadyExists(_)));
    assert!(context.localize(&error).contains("ABC1234"));
}

#[tokio::test]
async fn test_policy_follows_configuration() {
    let config = AppConfig {
        odometer_max_increase_percent: 30,
        ..memory_config("pt-BR")
    };
    let context = FleetContext::in_memory(&config).unwrap();
    assert_eq!(context.usage.policy().max_increase_percent(), 30);
}
