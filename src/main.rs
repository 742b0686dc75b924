//! Libris Server - school library management
//!
//! Serves the REST API and runs the overdue monitor and snapshot export tasks.

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{
    api,
    config::AppConfig,
    repository::{self, Repository},
    seed,
    services::{self, background, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris_server={},tower_http=debug", config.logging.level).into());

    let json = config.logging.format == "json";
    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the database and bring the schema up to date
    let pool = repository::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    repository::migrate(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    seed::seed_if_empty(&pool, services::today())
        .await
        .context("Failed to seed database")?;

    // Save server address before moving config
    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository);

    // Background tasks
    if config.monitor.overdue_check_interval_secs > 0 {
        background::spawn_overdue_monitor(
            services.overdue.clone(),
            Duration::from_secs(config.monitor.overdue_check_interval_secs),
        );
        tracing::info!(
            "Overdue monitor running every {}s",
            config.monitor.overdue_check_interval_secs
        );
    }

    if config.export.interval_secs > 0 {
        background::spawn_snapshot_export(
            services.export.clone(),
            PathBuf::from(&config.export.directory),
            Duration::from_secs(config.export.interval_secs),
        );
        tracing::info!(
            "Snapshot export to {} every {}s",
            config.export.directory,
            config.export.interval_secs
        );
    }

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
