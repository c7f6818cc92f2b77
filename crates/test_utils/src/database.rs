//! Database Test Utilities
//!
//! Starts a disposable PostgreSQL container and applies the fleet
//! migrations. Tests that use it need a Docker daemon.
//!
//! A pool is bound to the runtime that opened it, so each `#[tokio::test]`
//! starts its own database.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A PostgreSQL test container with a migrated schema
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pub url: String,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new container and runs the migrations
    pub async fn new() -> Result<Self, BoxError> {
        let container = Postgres::default().start().await?;
        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432).await?;
        let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;

        infra_db::run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            url,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Clears all data while preserving the schema
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        sqlx::query("TRUNCATE TABLE events, drivers, cars CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
