//! Service wiring
//!
//! `FleetContext` owns one store, one event bus and every fleet service
//! built over them.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use core_kernel::{
    FluentTranslator, HealthCheckResult, HealthCheckable, InMemoryEventBus, LocalisationError,
    Timezone,
};
use domain_fleet::i18n::translator;
use domain_fleet::services::{
    CarService, DriverService, FleetEventBus, ReportService, UsageService,
};
use domain_fleet::{
    CarRepository, DriverRepository, EventRepository, FleetError, FleetEvent, InMemoryFleetStore,
    OdometerPolicy,
};
use infra_db::{create_pool, DatabaseConfig, DatabaseError, FleetCounts, PostgresFleetStore};

use crate::config::{AppConfig, ConfigError, StoreKind};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Localisation(#[from] LocalisationError),
}

/// The store behind a context
#[derive(Clone)]
pub enum StoreHandle {
    Memory(Arc<InMemoryFleetStore>),
    Postgres(Arc<PostgresFleetStore>),
}

impl StoreHandle {
    pub async fn health_check(&self) -> HealthCheckResult {
        match self {
            StoreHandle::Memory(store) => store.health_check().await,
            StoreHandle::Postgres(store) => store.health_check().await,
        }
    }

    pub async fn counts(&self) -> Result<FleetCounts, DatabaseError> {
        match self {
            StoreHandle::Memory(store) => {
                let (cars, drivers, events) = store.counts().await;
                Ok(FleetCounts {
                    cars: cars as i64,
                    drivers: drivers as i64,
                    events: events as i64,
                })
            }
            StoreHandle::Postgres(store) => store.counts().await,
        }
    }
}

/// Store health and table sizes
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub health: HealthCheckResult,
    pub cars: i64,
    pub drivers: i64,
    pub events: i64,
    pub locale: String,
    pub timezone: String,
    pub odometer_max_increase_percent: u32,
}

pub struct FleetContext {
    pub cars: CarService,
    pub drivers: DriverService,
    pub usage: UsageService,
    pub reports: ReportService,
    pub bus: Arc<InMemoryEventBus<FleetEvent>>,
    pub translator: FluentTranslator,
    pub timezone: Timezone,
    store: StoreHandle,
}

impl FleetContext {
    /// Builds the context over the store selected in the configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        match config.store {
            StoreKind::Memory => Self::in_memory(config),
            StoreKind::Postgres => Self::postgres(config).await,
        }
    }

    /// Builds the context over a fresh in-memory store
    pub fn in_memory(config: &AppConfig) -> Result<Self, ContextError> {
        let store = Arc::new(InMemoryFleetStore::new());
        Self::assemble(store.clone(), StoreHandle::Memory(store), config)
    }

    /// Connects to PostgreSQL and builds the context over it
    ///
    /// Migrations are not run here.
    pub async fn postgres(config: &AppConfig) -> Result<Self, ContextError> {
        info!(url = %config.redacted_database_url(), "connecting to database");
        let pool = create_pool(
            DatabaseConfig::new(&config.database_url).max_connections(config.max_connections),
        )
        .await?;
        let store = Arc::new(PostgresFleetStore::new(pool));
        Self::assemble(store.clone(), StoreHandle::Postgres(store), config)
    }

    fn assemble<S>(
        store: Arc<S>,
        handle: StoreHandle,
        config: &AppConfig,
    ) -> Result<Self, ContextError>
    where
        S: CarRepository + DriverRepository + EventRepository,
    {
        config.validate()?;
        let bus = Arc::new(InMemoryEventBus::<FleetEvent>::new());
        let shared: FleetEventBus = bus.clone();
        let policy = OdometerPolicy::new(config.odometer_max_increase_percent);

        Ok(Self {
            cars: CarService::new(store.clone(), store.clone()).with_event_bus(shared.clone()),
            drivers: DriverService::new(store.clone(), store.clone())
                .with_event_bus(shared.clone()),
            usage: UsageService::new(store.clone(), store.clone(), store.clone())
                .with_policy(policy)
                .with_event_bus(shared),
            reports: ReportService::new(store.clone(), store.clone(), store),
            bus,
            translator: translator(&config.locale)?,
            timezone: config.timezone()?,
            store: handle,
        })
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Renders an error in the configured locale
    pub fn localize(&self, error: &FleetError) -> String {
        error.localize(&self.translator)
    }

    pub async fn status(&self) -> Result<StatusReport, ContextError> {
        let health = self.store.health_check().await;
        let counts = self.store.counts().await?;

        Ok(StatusReport {
            health,
            cars: counts.cars,
            drivers: counts.drivers,
            events: counts.events,
            locale: self.translator.locale().to_string(),
            timezone: self.timezone.name().to_string(),
            odometer_max_increase_percent: self.usage.policy().max_increase_percent(),
        })
    }
}
