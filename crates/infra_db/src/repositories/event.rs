//! Event table access

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{CarId, DriverId, EventId, ManagerId, Period};
use domain_fleet::{Event, EventRecord, EventStatus};

use crate::error::DatabaseError;

/// A row of the `events` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub manager_id: Uuid,
    pub driver_id: Uuid,
    pub car_id: Uuid,
    pub odometer: i64,
    pub status: String,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EventRow {
    pub fn is_open(&self) -> bool {
        self.status == EventStatus::Exit.as_str()
    }
}

impl TryFrom<&Event> for EventRow {
    type Error = DatabaseError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        let record = event.to_record();
        let odometer = i64::try_from(record.odometer).map_err(|_| {
            DatabaseError::mapping(format!("odometer {} does not fit BIGINT", record.odometer))
        })?;

        Ok(Self {
            id: record.id.into(),
            manager_id: record.manager_id.into(),
            driver_id: record.driver_id.into(),
            car_id: record.car_id.into(),
            odometer,
            status: record.status.as_str().to_string(),
            start_at: record.start_at,
            end_at: record.end_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = DatabaseError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let record = EventRecord {
            id: EventId::from(row.id),
            manager_id: ManagerId::from(row.manager_id),
            driver_id: DriverId::from(row.driver_id),
            car_id: CarId::from(row.car_id),
            odometer: u64::try_from(row.odometer).map_err(|_| {
                DatabaseError::mapping(format!("event {id}: negative odometer {}", row.odometer))
            })?,
            status: row
                .status
                .parse::<EventStatus>()
                .map_err(|e| DatabaseError::mapping(format!("event {id}: {e}")))?,
            start_at: row.start_at,
            end_at: row.end_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        Event::try_from(record).map_err(|e| DatabaseError::mapping(format!("event {id}: {e}")))
    }
}

const SELECT_EVENTS: &str = r#"
    SELECT id, manager_id, driver_id, car_id, odometer, status,
           start_at, end_at, created_at, updated_at
    FROM events
"#;

const ORDER: &str = "ORDER BY start_at, id";

/// Queries against the `events` table
#[derive(Debug, Clone)]
pub struct EventTable {
    pool: PgPool,
}

impl EventTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<EventRow>, DatabaseError> {
        let row = sqlx::query_as::<_, EventRow>(&format!("{SELECT_EVENTS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<EventRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!("{SELECT_EVENTS} {ORDER}"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn open_for_car(&self, car_id: Uuid) -> Result<Option<EventRow>, DatabaseError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} WHERE car_id = $1 AND status = 'EXIT'"
        ))
        .bind(car_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Most recent open event of a driver
    pub async fn open_for_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Option<EventRow>, DatabaseError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} WHERE driver_id = $1 AND status = 'EXIT' ORDER BY start_at DESC LIMIT 1"
        ))
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn by_car(&self, car_id: Uuid) -> Result<Vec<EventRow>, DatabaseError> {
        let query = format!("{SELECT_EVENTS} WHERE car_id = $1 {ORDER}");
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(car_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn by_driver(&self, driver_id: Uuid) -> Result<Vec<EventRow>, DatabaseError> {
        let rows =
            sqlx::query_as::<_, EventRow>(&format!("{SELECT_EVENTS} WHERE driver_id = $1 {ORDER}"))
                .bind(driver_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// Events whose start falls inside the period, bounds included
    pub async fn started_in(&self, period: Period) -> Result<Vec<EventRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} WHERE start_at BETWEEN $1 AND $2 {ORDER}"
        ))
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn by_driver_started_in(
        &self,
        driver_id: Uuid,
        period: Period,
    ) -> Result<Vec<EventRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} WHERE driver_id = $1 AND start_at BETWEEN $2 AND $3 {ORDER}"
        ))
        .bind(driver_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert(conn: &mut PgConnection, row: &EventRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, manager_id, driver_id, car_id, odometer, status,
                start_at, end_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(row.id)
        .bind(row.manager_id)
        .bind(row.driver_id)
        .bind(row.car_id)
        .bind(row.odometer)
        .bind(&row.status)
        .bind(row.start_at)
        .bind(row.end_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Overwrites the mutable columns; returns false when no row matched
    pub async fn update(conn: &mut PgConnection, row: &EventRow) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET odometer = $2, status = $3, end_at = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(row.odometer)
        .bind(&row.status)
        .bind(row.end_at)
        .bind(row.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Locks the event row and returns its status
    pub async fn lock_status(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<String>, DatabaseError> {
        let status =
            sqlx::query_scalar::<_, String>("SELECT status FROM events WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(status)
    }

    /// Whether the car has an open event, as seen by the current transaction
    pub async fn has_open_for_car(
        conn: &mut PgConnection,
        car_id: Uuid,
    ) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM events WHERE car_id = $1 AND status = 'EXIT')",
        )
        .bind(car_id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_event_row() {
        let mut event =
            Event::checkout(ManagerId::new(), DriverId::new(), CarId::new(), 1000, Utc::now());
        event.finalize(Utc::now(), 1090).unwrap();

        let row = EventRow::try_from(&event).unwrap();
        assert_eq!(row.status, "ENTRY");
        assert!(!row.is_open());
        assert_eq!(Event::try_from(row).unwrap(), event);
    }

    #[test]
    fn test_open_row_with_end_is_rejected() {
        let event =
            Event::checkout(ManagerId::new(), DriverId::new(), CarId::new(), 1000, Utc::now());
        let mut row = EventRow::try_from(&event).unwrap();
        assert!(row.is_open());

        row.end_at = Some(Utc::now());
        assert!(matches!(Event::try_from(row), Err(DatabaseError::Mapping(_))));
    }
}
