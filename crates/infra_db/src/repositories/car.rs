//! Car table access
//!
//! Reads go through the pool. Writes take a connection so the adapter can
//! run them inside a transaction together with event writes.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;

use core_kernel::{CarId, ManagerId};
use domain_fleet::{Car, CarRecord, CarStatus};

use crate::error::DatabaseError;

/// A row of the `cars` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CarRow {
    pub id: Uuid,
    pub manager_id: Uuid,
    pub license_plate: String,
    pub renavam: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub odometer: i64,
    pub status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub inactive_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Car> for CarRow {
    type Error = DatabaseError;

    fn try_from(car: &Car) -> Result<Self, Self::Error> {
        let record = car.to_record();
        let odometer = i64::try_from(record.odometer).map_err(|_| {
            DatabaseError::mapping(format!("odometer {} does not fit BIGINT", record.odometer))
        })?;

        Ok(Self {
            id: record.id.into(),
            manager_id: record.manager_id.into(),
            license_plate: record.license_plate,
            renavam: record.renavam,
            brand: record.brand,
            model: record.model,
            year: i32::from(record.year),
            color: record.color,
            odometer,
            status: record.status.as_str().to_string(),
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            inactive_at: record.inactive_at,
        })
    }
}

impl TryFrom<CarRow> for Car {
    type Error = DatabaseError;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let record = CarRecord {
            id: CarId::from(row.id),
            manager_id: ManagerId::from(row.manager_id),
            license_plate: row.license_plate,
            brand: row.brand,
            model: row.model,
            year: u16::try_from(row.year).map_err(|_| {
                DatabaseError::mapping(format!("car {id}: year {} out of range", row.year))
            })?,
            color: row.color,
            odometer: u64::try_from(row.odometer).map_err(|_| {
                DatabaseError::mapping(format!("car {id}: negative odometer {}", row.odometer))
            })?,
            status: row
                .status
                .parse::<CarStatus>()
                .map_err(|e| DatabaseError::mapping(format!("car {id}: {e}")))?,
            renavam: row.renavam,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            inactive_at: row.inactive_at,
        };

        Car::try_from(record).map_err(|e| DatabaseError::mapping(format!("car {id}: {e}")))
    }
}

fn bind_row<'q>(
    query: Query<'q, Postgres, PgArguments>,
    row: &'q CarRow,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(row.id)
        .bind(row.manager_id)
        .bind(&row.license_plate)
        .bind(&row.renavam)
        .bind(&row.brand)
        .bind(&row.model)
        .bind(row.year)
        .bind(&row.color)
        .bind(row.odometer)
        .bind(&row.status)
        .bind(row.is_active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.inactive_at)
}

const SELECT_CARS: &str = r#"
    SELECT id, manager_id, license_plate, renavam, brand, model, year, color,
           odometer, status, is_active, created_at, updated_at, inactive_at
    FROM cars
"#;

const INSERT_CAR: &str = r#"
    INSERT INTO cars (
        id, manager_id, license_plate, renavam, brand, model, year, color,
        odometer, status, is_active, created_at, updated_at, inactive_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
"#;

const UPSERT_CAR: &str = r#"
    INSERT INTO cars (
        id, manager_id, license_plate, renavam, brand, model, year, color,
        odometer, status, is_active, created_at, updated_at, inactive_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (id) DO UPDATE SET
        license_plate = EXCLUDED.license_plate,
        renavam = EXCLUDED.renavam,
        brand = EXCLUDED.brand,
        model = EXCLUDED.model,
        year = EXCLUDED.year,
        color = EXCLUDED.color,
        odometer = GREATEST(cars.odometer, EXCLUDED.odometer),
        is_active = EXCLUDED.is_active,
        updated_at = EXCLUDED.updated_at,
        inactive_at = EXCLUDED.inactive_at
"#;

const UPDATE_CAR_USAGE: &str = r#"
    UPDATE cars SET odometer = $2, status = $3, updated_at = $4
    WHERE id = $1
"#;

/// Queries against the `cars` table
#[derive(Debug, Clone)]
pub struct CarTable {
    pool: PgPool,
}

impl CarTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<CarRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CarRow>(&format!("{SELECT_CARS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_license_plate(
        &self,
        plate: &str,
    ) -> Result<Option<CarRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CarRow>(&format!("{SELECT_CARS} WHERE license_plate = $1"))
            .bind(plate)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_renavam(&self, renavam: &str) -> Result<Option<CarRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CarRow>(&format!("{SELECT_CARS} WHERE renavam = $1"))
            .bind(renavam)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// All cars in registration order
    pub async fn list(&self) -> Result<Vec<CarRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CarRow>(&format!("{SELECT_CARS} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a car; returns false when no row matched
    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert(conn: &mut PgConnection, row: &CarRow) -> Result<(), DatabaseError> {
        bind_row(sqlx::query(INSERT_CAR), row).execute(conn).await?;
        Ok(())
    }

    /// Inserts the car or overwrites its descriptive columns
    ///
    /// An existing row keeps its status and its odometer never decreases.
    pub async fn upsert(conn: &mut PgConnection, row: &CarRow) -> Result<(), DatabaseError> {
        bind_row(sqlx::query(UPSERT_CAR), row).execute(conn).await?;
        Ok(())
    }

    /// Writes the usage columns; returns false when no row matched
    pub async fn update_usage(
        conn: &mut PgConnection,
        row: &CarRow,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(UPDATE_CAR_USAGE)
            .bind(row.id)
            .bind(row.odometer)
            .bind(&row.status)
            .bind(row.updated_at)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Locks the car row until the surrounding transaction ends
    ///
    /// Returns false when the car does not exist.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<bool, DatabaseError> {
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM cars WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(locked.is_some())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
