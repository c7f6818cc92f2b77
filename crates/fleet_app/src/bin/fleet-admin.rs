//! Fleet Usage Core - Admin Binary
//!
//! ```bash
//! # Apply pending migrations
//! fleet-admin migrate
//!
//! # Print store health and fleet counts as JSON
//! fleet-admin status
//! ```
//!
//! Configuration comes from `fleet.toml` and `FLEET_*` variables, e.g.
//! `FLEET_DATABASE_URL`, `FLEET_STORE` (`postgres` or `memory`),
//! `FLEET_LOG_FORMAT` (`pretty` or `json`) and `FLEET_LOCALE`.

use anyhow::{bail, Context};
use tracing::info;

use fleet_app::{telemetry, AppConfig, Command, CommandLine, FleetContext, StoreKind};
use infra_db::{create_pool, run_migrations, DatabaseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("loading configuration")?;
    telemetry::init_tracing(&config).context("installing tracing subscriber")?;

    let command = cli.command();
    info!(?command, store = ?config.store, "fleet-admin starting");

    match command {
        Command::Migrate => migrate(&config).await,
        Command::Status => status(&config).await,
    }
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    if config.store != StoreKind::Postgres {
        bail!("migrations only apply to the postgres store");
    }

    let pool = create_pool(
        DatabaseConfig::new(&config.database_url).max_connections(config.max_connections),
    )
    .await
    .with_context(|| format!("connecting to {}", config.redacted_database_url()))?;

    run_migrations(&pool).await.context("running migrations")?;
    info!("migrations applied");
    Ok(())
}

async fn status(config: &AppConfig) -> anyhow::Result<()> {
    let context = FleetContext::from_config(config)
        .await
        .context("building fleet context")?;
    let report = context.status().await.context("reading store status")?;

    if !report.health.is_operational() {
        info!(message = ?report.health.message, "store is not operational");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
