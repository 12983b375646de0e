//! freight-core server entry point.
//!
//! Starts the Axum HTTP server with webhook, container, ledger, and
//! report endpoints.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use freight_core::api;
use freight_core::app_state::AppState;
use freight_core::config::CoreConfig;
use freight_core::domain::{ContainerStore, EventBus, LedgerStore, ShipmentDirectory};
use freight_core::persistence::postgres::PostgresPersistence;
use freight_core::service::{LedgerService, TrackingService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = CoreConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting freight-core");

    // Build domain layer
    let container_store = Arc::new(ContainerStore::new());
    let ledger_store = Arc::new(LedgerStore::new());
    let shipments = Arc::new(ShipmentDirectory::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let tracking = Arc::new(TrackingService::new(
        Arc::clone(&container_store),
        event_bus.clone(),
        config.dedup_window_secs,
        chrono::Duration::days(config.alert_warning_days),
    ));
    let ledger = Arc::new(LedgerService::new(
        ledger_store,
        shipments,
        event_bus.clone(),
    ));

    // Optional write-behind persistence
    if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let persistence = PostgresPersistence::new(pool);
        freight_core::persistence::spawn_tasks(
            persistence,
            &event_bus,
            Arc::clone(&container_store),
            &config,
        );
        tracing::info!("persistence layer enabled");
    }

    // Build application state
    let app_state = AppState { tracking, ledger };

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
