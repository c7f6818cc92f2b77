//! Driver table access

use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;

use core_kernel::DriverId;
use domain_fleet::{Driver, DriverRecord, LicenseCategory};

use crate::error::DatabaseError;

/// A row of the `drivers` table; the address is stored flattened
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DriverRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub cnh: String,
    pub cnh_type: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub number: i32,
    pub district: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub inactive_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Driver> for DriverRow {
    type Error = DatabaseError;

    fn try_from(driver: &Driver) -> Result<Self, Self::Error> {
        let record = driver.to_record();
        let number = i32::try_from(record.number).map_err(|_| {
            DatabaseError::mapping(format!("address number {} does not fit INTEGER", record.number))
        })?;

        Ok(Self {
            id: record.id.into(),
            first_name: record.first_name,
            last_name: record.last_name,
            cnh: record.cnh,
            cnh_type: record.cnh_type.as_str().to_string(),
            email: record.email,
            phone: record.phone,
            street: record.street,
            number,
            district: record.district,
            zip_code: record.zip_code,
            city: record.city,
            state: record.state,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            inactive_at: record.inactive_at,
        })
    }
}

impl TryFrom<DriverRow> for Driver {
    type Error = DatabaseError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let record = DriverRecord {
            id: DriverId::from(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            cnh: row.cnh,
            cnh_type: row
                .cnh_type
                .parse::<LicenseCategory>()
                .map_err(|e| DatabaseError::mapping(format!("driver {id}: {e}")))?,
            email: row.email,
            phone: row.phone,
            street: row.street,
            number: u32::try_from(row.number).map_err(|_| {
                DatabaseError::mapping(format!("driver {id}: address number {}", row.number))
            })?,
            district: row.district,
            zip_code: row.zip_code,
            city: row.city,
            state: row.state,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            inactive_at: row.inactive_at,
        };

        Driver::try_from(record).map_err(|e| DatabaseError::mapping(format!("driver {id}: {e}")))
    }
}

fn bind_row<'q>(
    query: Query<'q, Postgres, PgArguments>,
    row: &'q DriverRow,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(row.id)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.cnh)
        .bind(&row.cnh_type)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.street)
        .bind(row.number)
        .bind(&row.district)
        .bind(&row.zip_code)
        .bind(&row.city)
        .bind(&row.state)
        .bind(row.is_active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.inactive_at)
}

const SELECT_DRIVERS: &str = r#"
    SELECT id, first_name, last_name, cnh, cnh_type, email, phone,
           street, number, district, zip_code, city, state,
           is_active, created_at, updated_at, inactive_at
    FROM drivers
"#;

const INSERT_DRIVER: &str = r#"
    INSERT INTO drivers (
        id, first_name, last_name, cnh, cnh_type, email, phone,
        street, number, district, zip_code, city, state,
        is_active, created_at, updated_at, inactive_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
"#;

const UPSERT_DRIVER: &str = r#"
    INSERT INTO drivers (
        id, first_name, last_name, cnh, cnh_type, email, phone,
        street, number, district, zip_code, city, state,
        is_active, created_at, updated_at, inactive_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
    ON CONFLICT (id) DO UPDATE SET
        first_name = EXCLUDED.first_name,
        last_name = EXCLUDED.last_name,
        cnh = EXCLUDED.cnh,
        cnh_type = EXCLUDED.cnh_type,
        email = EXCLUDED.email,
        phone = EXCLUDED.phone,
        street = EXCLUDED.street,
        number = EXCLUDED.number,
        district = EXCLUDED.district,
        zip_code = EXCLUDED.zip_code,
        city = EXCLUDED.city,
        state = EXCLUDED.state,
        is_active = EXCLUDED.is_active,
        updated_at = EXCLUDED.updated_at,
        inactive_at = EXCLUDED.inactive_at
"#;

/// Queries against the `drivers` table
#[derive(Debug, Clone)]
pub struct DriverTable {
    pool: PgPool,
}

impl DriverTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<DriverRow>, DatabaseError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!("{SELECT_DRIVERS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<DriverRow>, DatabaseError> {
        self.find_one("email", email).await
    }

    pub async fn find_by_cnh(&self, cnh: &str) -> Result<Option<DriverRow>, DatabaseError> {
        self.find_one("cnh", cnh).await
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<DriverRow>, DatabaseError> {
        self.find_one("phone", phone).await
    }

    /// All drivers in registration order
    pub async fn list(&self) -> Result<Vec<DriverRow>, DatabaseError> {
        let rows =
            sqlx::query_as::<_, DriverRow>(&format!("{SELECT_DRIVERS} ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drivers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a driver; returns false when no row matched
    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert(conn: &mut PgConnection, row: &DriverRow) -> Result<(), DatabaseError> {
        bind_row(sqlx::query(INSERT_DRIVER), row).execute(conn).await?;
        Ok(())
    }

    pub async fn upsert(conn: &mut PgConnection, row: &DriverRow) -> Result<(), DatabaseError> {
        bind_row(sqlx::query(UPSERT_DRIVER), row).execute(conn).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // `column` is always one of the unique text columns above
    async fn find_one(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<DriverRow>, DatabaseError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!("{SELECT_DRIVERS} WHERE {column} = $1"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
