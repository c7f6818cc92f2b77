//! PostgreSQL Fleet Adapter
//!
//! `PostgresFleetStore` implements `CarRepository`, `DriverRepository` and
//! `EventRepository` on top of the table modules. Rows are converted back
//! into domain entities through their validating constructors, so a row
//! that no longer satisfies the domain rules surfaces as a
//! `PortError::Transformation`.
//!
//! Checkout, check-in and cancellation each run in one transaction that
//! locks the car (checkout) or the event (check-in, cancellation) first.
//! The partial unique index on open events backs the checkout lock.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, CarId, DomainPort, DriverId, EventId, HealthCheckResult, HealthCheckable,
    Period, PortError,
};
use domain_fleet::{
    Car, CarRepository, Cnh, Driver, DriverRepository, Email, Event, EventRepository,
    LicensePlate, Phone, Renavam,
};

use crate::error::DatabaseError;
use crate::repositories::{CarRow, CarTable, DriverRow, DriverTable, EventRow, EventTable};

const ADAPTER_ID: &str = "postgres-fleet-store";

/// Row counts per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FleetCounts {
    pub cars: i64,
    pub drivers: i64,
    pub events: i64,
}

/// PostgreSQL-backed implementation of the fleet repository ports
#[derive(Debug, Clone)]
pub struct PostgresFleetStore {
    cars: CarTable,
    drivers: DriverTable,
    events: EventTable,
    pool: PgPool,
}

impl PostgresFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            cars: CarTable::new(pool.clone()),
            drivers: DriverTable::new(pool.clone()),
            events: EventTable::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn counts(&self) -> Result<FleetCounts, DatabaseError> {
        Ok(FleetCounts {
            cars: self.cars.count().await?,
            drivers: self.drivers.count().await?,
            events: self.events.count().await?,
        })
    }

    async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, PortError> {
        Ok(self.pool.begin().await.map_err(DatabaseError::from)?)
    }
}

impl DomainPort for PostgresFleetStore {}

#[async_trait]
impl HealthCheckable for PostgresFleetStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

fn to_entities<R, T>(rows: Vec<R>) -> Result<Vec<T>, PortError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(PortError::from))
        .collect()
}

fn to_entity<R, T>(row: Option<R>) -> Result<Option<T>, PortError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    row.map(T::try_from).transpose().map_err(PortError::from)
}

// ============================================================================
// Cars
// ============================================================================

#[async_trait]
impl CarRepository for PostgresFleetStore {
    #[instrument(skip(self), fields(car_id = %id))]
    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, PortError> {
        debug!("fetching car");
        to_entity(self.cars.get(id.into()).await?)
    }

    async fn find_by_license_plate(&self, plate: &LicensePlate) -> Result<Option<Car>, PortError> {
        to_entity(self.cars.find_by_license_plate(plate.as_str()).await?)
    }

    async fn find_by_renavam(&self, renavam: &Renavam) -> Result<Option<Car>, PortError> {
        to_entity(self.cars.find_by_renavam(renavam.as_str()).await?)
    }

    async fn find_all(&self) -> Result<Vec<Car>, PortError> {
        to_entities(self.cars.list().await?)
    }

    #[instrument(skip(self, car), fields(car_id = %car.id()))]
    async fn create(&self, car: &Car) -> Result<(), PortError> {
        debug!("inserting car");
        let row = CarRow::try_from(car)?;
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        CarTable::insert(&mut conn, &row).await?;
        Ok(())
    }

    #[instrument(skip(self, car), fields(car_id = %car.id()))]
    async fn save(&self, car: &Car) -> Result<(), PortError> {
        debug!("saving car");
        let row = CarRow::try_from(car)?;
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        CarTable::upsert(&mut conn, &row).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(car_id = %id))]
    async fn delete(&self, id: CarId) -> Result<(), PortError> {
        if self.cars.delete(id.into()).await? {
            Ok(())
        } else {
            Err(PortError::not_found("Car", id))
        }
    }
}

// ============================================================================
// Drivers
// ============================================================================

#[async_trait]
impl DriverRepository for PostgresFleetStore {
    #[instrument(skip(self), fields(driver_id = %id))]
    async fn find_by_id(&self, id: DriverId) -> Result<Option<Driver>, PortError> {
        debug!("fetching driver");
        to_entity(self.drivers.get(id.into()).await?)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Driver>, PortError> {
        to_entity(self.drivers.find_by_email(email.as_str()).await?)
    }

    async fn find_by_cnh(&self, cnh: &Cnh) -> Result<Option<Driver>, PortError> {
        to_entity(self.drivers.find_by_cnh(cnh.as_str()).await?)
    }

    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Driver>, PortError> {
        to_entity(self.drivers.find_by_phone(phone.as_str()).await?)
    }

    async fn find_all(&self) -> Result<Vec<Driver>, PortError> {
        to_entities(self.drivers.list().await?)
    }

    #[instrument(skip(self, driver), fields(driver_id = %driver.id()))]
    async fn create(&self, driver: &Driver) -> Result<(), PortError> {
        debug!("inserting driver");
        let row = DriverRow::try_from(driver)?;
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        DriverTable::insert(&mut conn, &row).await?;
        Ok(())
    }

    #[instrument(skip(self, driver), fields(driver_id = %driver.id()))]
    async fn save(&self, driver: &Driver) -> Result<(), PortError> {
        debug!("saving driver");
        let row = DriverRow::try_from(driver)?;
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        DriverTable::upsert(&mut conn, &row).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(driver_id = %id))]
    async fn delete(&self, id: DriverId) -> Result<(), PortError> {
        if self.drivers.delete(id.into()).await? {
            Ok(())
        } else {
            Err(PortError::not_found("Driver", id))
        }
    }
}

// ============================================================================
// Events
// ============================================================================

#[async_trait]
impl EventRepository for PostgresFleetStore {
    #[instrument(skip(self), fields(event_id = %id))]
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, PortError> {
        debug!("fetching event");
        to_entity(self.events.get(id.into()).await?)
    }

    async fn find_all(&self) -> Result<Vec<Event>, PortError> {
        to_entities(self.events.list().await?)
    }

    async fn find_active_event_by_car_id(&self, car_id: CarId) -> Result<Option<Event>, PortError> {
        to_entity(self.events.open_for_car(car_id.into()).await?)
    }

    async fn find_active_event_by_driver_id(
        &self,
        driver_id: DriverId,
    ) -> Result<Option<Event>, PortError> {
        to_entity(self.events.open_for_driver(driver_id.into()).await?)
    }

    async fn find_many_by_car_id(&self, car_id: CarId) -> Result<Vec<Event>, PortError> {
        to_entities(self.events.by_car(car_id.into()).await?)
    }

    async fn find_many_by_driver_id(&self, driver_id: DriverId) -> Result<Vec<Event>, PortError> {
        to_entities(self.events.by_driver(driver_id.into()).await?)
    }

    async fn find_many_by_period(&self, period: Period) -> Result<Vec<Event>, PortError> {
        to_entities(self.events.started_in(period).await?)
    }

    async fn find_many_by_driver_and_period(
        &self,
        driver_id: DriverId,
        period: Period,
    ) -> Result<Vec<Event>, PortError> {
        to_entities(self.events.by_driver_started_in(driver_id.into(), period).await?)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id()))]
    async fn create(&self, event: &Event) -> Result<(), PortError> {
        let row = EventRow::try_from(event)?;
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        EventTable::insert(&mut conn, &row).await?;
        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id()))]
    async fn save(&self, event: &Event) -> Result<(), PortError> {
        let row = EventRow::try_from(event)?;
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        if !EventTable::update(&mut conn, &row).await? {
            EventTable::insert(&mut conn, &row).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %id))]
    async fn delete(&self, id: EventId) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        if EventTable::delete(&mut conn, id.into()).await? {
            Ok(())
        } else {
            Err(PortError::not_found("Event", id))
        }
    }

    #[instrument(skip(self, event, car), fields(event_id = %event.id(), car_id = %car.id()))]
    async fn record_checkout(&self, event: &Event, car: &Car) -> Result<(), PortError> {
        let event_row = EventRow::try_from(event)?;
        let car_row = CarRow::try_from(car)?;
        let mut tx = self.begin().await?;

        if !CarTable::lock(&mut tx, car_row.id).await? {
            return Err(PortError::not_found("Car", car.id()));
        }
        if EventTable::has_open_for_car(&mut tx, car_row.id).await? {
            return Err(PortError::conflict(format!(
                "car {} already has an open event",
                car.id()
            )));
        }

        EventTable::insert(&mut tx, &event_row).await?;
        update_car_usage(&mut tx, &car_row, car.id()).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!("checkout recorded");
        Ok(())
    }

    #[instrument(skip(self, event, car), fields(event_id = %event.id(), car_id = %car.id()))]
    async fn record_check_in(&self, event: &Event, car: &Car) -> Result<(), PortError> {
        let event_row = EventRow::try_from(event)?;
        let car_row = CarRow::try_from(car)?;
        let mut tx = self.begin().await?;

        lock_open_event(&mut tx, event.id()).await?;
        EventTable::update(&mut tx, &event_row).await?;
        update_car_usage(&mut tx, &car_row, car.id()).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!("check-in recorded");
        Ok(())
    }

    #[instrument(skip(self, car), fields(event_id = %event_id, car_id = %car.id()))]
    async fn discard_open_event(&self, event_id: EventId, car: &Car) -> Result<(), PortError> {
        let car_row = CarRow::try_from(car)?;
        let mut tx = self.begin().await?;

        lock_open_event(&mut tx, event_id).await?;
        EventTable::delete(&mut tx, event_id.into()).await?;
        update_car_usage(&mut tx, &car_row, car.id()).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!("open event discarded");
        Ok(())
    }
}

async fn lock_open_event(conn: &mut sqlx::PgConnection, id: EventId) -> Result<(), PortError> {
    match EventTable::lock_status(conn, id.into()).await? {
        None => Err(PortError::not_found("Event", id)),
        Some(status) if status != domain_fleet::EventStatus::Exit.as_str() => Err(
            DatabaseError::StateConflict(format!("event {} is no longer open", id)).into(),
        ),
        Some(_) => Ok(()),
    }
}

async fn update_car_usage(
    conn: &mut sqlx::PgConnection,
    row: &CarRow,
    id: CarId,
) -> Result<(), PortError> {
    if CarTable::update_usage(conn, row).await? {
        Ok(())
    } else {
        Err(PortError::not_found("Car", id))
    }
}
