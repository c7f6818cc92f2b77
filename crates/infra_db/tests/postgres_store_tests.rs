//! PostgreSQL store tests
//!
//! Each test starts its own container; run with `cargo test -- --ignored`
//! on a machine with Docker.

use std::sync::Arc;

use chrono::{Duration, Utc};

use core_kernel::{AdapterHealth, HealthCheckable, Period, PortError};
use domain_fleet::services::{
    CarService, CheckoutRequest, DriverService, ReportService, UpdateCarRequest, UsageService,
};
use domain_fleet::{
    CarDetailsUpdate, CarRepository, CarStatus, ErrorKind, EventRepository, EventStatus,
    FleetError, OdometerPolicy,
};
use infra_db::PostgresFleetStore;
use test_utils::{
    assert_error_kind, assert_fleet_error, CarRequestBuilder, DriverRequestBuilder, TestDatabase,
};

struct Services {
    store: Arc<PostgresFleetStore>,
    cars: CarService,
    drivers: DriverService,
    usage: UsageService,
    reports: ReportService,
}

impl Services {
    fn new(db: &TestDatabase) -> Self {
        let store = Arc::new(PostgresFleetStore::new(db.pool().clone()));
        Self {
            cars: CarService::new(store.clone(), store.clone()),
            drivers: DriverService::new(store.clone(), store.clone()),
            usage: UsageService::new(store.clone(), store.clone(), store.clone())
                .with_policy(OdometerPolicy::default()),
            reports: ReportService::new(store.clone(), store.clone(), store.clone()),
            store,
        }
    }
}

// ============================================================================
// Store basics
// ============================================================================

mod store_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_health_check_and_counts() {
        let db = TestDatabase::new().await.unwrap();
        let services = Services::new(&db);

        let health = services.store.health_check().await;
        assert_eq!(health.status, AdapterHealth::Healthy);

        services.cars.create_car(CarRequestBuilder::new().build()).await.unwrap();
        let counts = services.store.counts().await.unwrap();
        assert_eq!((counts.cars, counts.drivers, counts.events), (1, 0, 0));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_car_survives_round_trip() {
        let db = TestDatabase::new().await.unwrap();
        let services = Services::new(&db);

        let car = services
            .cars
            .create_car(
                CarRequestBuilder::new()
                    .with_plate("bra-2e19")
                    .with_odometer(48_000)
                    .build(),
            )
            .await
            .unwrap();

        let loaded = services.cars.get_car_by_license_plate("BRA2E19").await.unwrap();
        assert_eq!(loaded.id(), car.id());
        assert_eq!(loaded.odometer(), 48_000);
        assert_eq!(loaded.status(), CarStatus::Available);
        assert_eq!(loaded.renavam(), car.renavam());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unique_index_reports_conflict() {
        let db = TestDatabase::new().await.unwrap();
        let services = Services::new(&db);

        let car = services.cars.create_car(CarRequestBuilder::new().build()).await.unwrap();
        let twin = domain_fleet::Car::register(
            car.manager_id(),
            car.license_plate().clone(),
            domain_fleet::Renavam::parse("99999999999").unwrap(),
            domain_fleet::CarDetails {
                brand: "Fiat".to_string(),
                model: "Uno".to_string(),
                year: 2010,
                color: "Branco".to_string(),
            },
            0,
        )
        .unwrap();

        let result = CarRepository::create(services.store.as_ref(), &twin).await;
        assert!(matches!(result, Err(PortError::Conflict { .. })));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_driver_profile_update_persists() {
        let db = TestDatabase::new().await.unwrap();
        let services = Services::new(&db);

        let driver = services
            .drivers
            .register_driver(DriverRequestBuilder::new().build())
            .await
            .unwrap();
        let updated = services
            .drivers
            .update_driver_profile(
                driver.id(),
                domain_fleet::services::UpdateDriverProfileRequest {
                    cnh_type: Some("C".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let loaded = services.drivers.get_driver_profile(driver.id()).await.unwrap();
        assert_eq!(loaded.cnh_type(), updated.cnh_type());
        assert_eq!(loaded.address(), driver.address());
        assert!(loaded.updated_at().is_some());
    }
}

// ============================================================================
// Usage flow
// ============================================================================

mod usage_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_checkout_and_check_in() {
        let db = TestDatabase::new().await.unwrap();
        let services = Services::new(&db);
        let manager_id = core_kernel::ManagerId::new();

        let car = services
            .cars
            .create_car(CarRequestBuilder::new().with_odometer(1000).build())
            .await
            .unwrap();
        let driver = services
            .drivers
            .register_driver(DriverRequestBuilder::new().build())
            .await
            .unwrap();

        let event = services
            .usage
            .create_event(CheckoutRequest {
                car_id: car.id(),
                driver_id: driver.id(),
                manager_id,
                odometer: 1050,
                status: EventStatus::Exit,
            })
            .await
            .unwrap();
        assert_eq!(services.cars.get_car(car.id()).await.unwrap().status(), CarStatus::InUse);

        let open = EventRepository::find_active_event_by_car_id(services.store.as_ref(), car.id())
            .await
            .unwrap();
        assert_eq!(open.map(|e| e.id()), Some(event.id()));

        assert_error_kind(
            &services.usage.finalize_event(event.id(), 1200).await,
            ErrorKind::InvalidOdometer,
        );

        services.usage.finalize_event(event.id(), 1090).await.unwrap();
        let stored = services.cars.get_car(car.id()).await.unwrap();
        assert_eq!(stored.odometer(), 1090);
        assert_eq!(stored.status(), CarStatus::Available);

        let now = Utc::now();
        let period = Period::new(now - Duration::hours(1), now + Duration::hours(1)).unwrap();
        let usages = services.reports.list_used_cars_by_period(period).await.unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].event.status, EventStatus::Entry);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_finalized_event_is_locked_against_deletion() {
        let db = TestDatabase::new().await.unwrap();
        let services = Services::new(&db);

        let car = services
            .cars
            .create_car(CarRequestBuilder::new().with_odometer(10).build())
            .await
            .unwrap();
        let driver = services
            .drivers
            .register_driver(DriverRequestBuilder::new().build())
            .await
            .unwrap();
        let event = services
            .usage
            .create_event(CheckoutRequest {
                car_id: car.id(),
                driver_id: driver.id(),
                manager_id: car.manager_id(),
                odometer: 10,
                status: EventStatus::Exit,
            })
            .await
            .unwrap();
        services.usage.finalize_event(event.id(), 11).await.unwrap();

        let discard =
            EventRepository::discard_open_event(services.store.as_ref(), event.id(), &car).await;
        assert!(matches!(discard, Err(PortError::Conflict { .. })));

        assert_fleet_error(services.usage.delete_event(event.id()).await, |e| {
            matches!(e, FleetError::CannotDeleteFinalizedEvent(_))
        });
        assert_fleet_error(services.drivers.delete_driver(driver.id()).await, |e| {
            matches!(e, FleetError::DriverHasEvents(_))
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires Docker"]
    async fn test_concurrent_checkouts_admit_one() {
        let db = TestDatabase::new().await.unwrap();
        let services = Arc::new(Services::new(&db));

        let car = services
            .cars
            .create_car(CarRequestBuilder::new().with_odometer(500).build())
            .await
            .unwrap();
        let mut drivers = Vec::new();
        for _ in 0..4 {
            drivers.push(
                services
                    .drivers
                    .register_driver(DriverRequestBuilder::new().build())
                    .await
                    .unwrap(),
            );
        }

        let handles: Vec<_> = drivers
            .into_iter()
            .map(|driver| {
                let services = Arc::clone(&services);
                let car_id = car.id();
                let manager_id = car.manager_id();
                tokio::spawn(async move {
                    services
                        .usage
                        .create_event(CheckoutRequest {
                            car_id,
                            driver_id: driver.id(),
                            manager_id,
                            odometer: 500,
                            status: EventStatus::Exit,
                        })
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(error) => assert_eq!(error.kind(), ErrorKind::CarInUse),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(services.reports.list_events_by_car(car.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_stale_car_save_keeps_usage_columns() {
        let db = TestDatabase::new().await.unwrap();
        let services = Services::new(&db);
        let car = services
            .cars
            .create_car(CarRequestBuilder::new().with_odometer(1000).build())
            .await
            .unwrap();
        let driver = services
            .drivers
            .register_driver(DriverRequestBuilder::new().build())
            .await
            .unwrap();

        let mut stale = CarRepository::find_by_id(services.store.as_ref(), car.id())
            .await
            .unwrap()
            .unwrap();
        let event = services
            .usage
            .create_event(CheckoutRequest {
                car_id: car.id(),
                driver_id: driver.id(),
                manager_id: car.manager_id(),
                odometer: 1000,
                status: EventStatus::Exit,
            })
            .await
            .unwrap();
        services.usage.finalize_event(event.id(), 1070).await.unwrap();
        services
            .usage
            .create_event(CheckoutRequest {
                car_id: car.id(),
                driver_id: driver.id(),
                manager_id: car.manager_id(),
                odometer: 1070,
                status: EventStatus::Exit,
            })
            .await
            .unwrap();

        stale
            .update_car(CarDetailsUpdate {
                color: Some("Azul".to_string()),
                ..Default::default()
            })
            .unwrap();
        CarRepository::save(services.store.as_ref(), &stale).await.unwrap();

        let stored = services.cars.get_car(car.id()).await.unwrap();
        assert_eq!(stored.status(), CarStatus::InUse);
        assert_eq!(stored.odometer(), 1070);
        assert_eq!(stored.color(), "Azul");

        let updated = services
            .cars
            .update_car(
                car.id(),
                UpdateCarRequest {
                    color: Some("Verde".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status(), CarStatus::InUse);
    }
}
