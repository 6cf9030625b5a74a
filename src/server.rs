/// Server setup and initialization
///
/// Wires together the database, storage, sync service, identity provider and
/// HTTP routes.

use crate::{
    api::workflows::{create_workflow_routes, AppState},
    auth::HeaderIdentity,
    config::Config,
    workflow::{database, service::WorkflowService, storage::WorkflowStorage},
};
use anyhow::Result;
use axum::{routing::get, Router};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Create the main Axum application with all routes
///
/// Opens the workflow database from configuration and ensures its schema.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("🏗️ Initializing workflow database");
    let pool = database::connect(&config.database).await?;

    build_router(pool, &config).await
}

/// Build the router on top of an existing pool
///
/// Creates the schema if needed. Used directly by tests with an in-memory pool.
pub async fn build_router(pool: SqlitePool, config: &Config) -> Result<Router> {
    tracing::info!("📋 Initializing workflow storage");
    let storage = WorkflowStorage::new(pool);
    storage
        .init_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize workflow schema: {}", e))?;

    let identity = HeaderIdentity::from_config(&config.auth)?;
    tracing::info!("🔐 Reading caller identity from '{}' header", config.auth.user_header);

    let app_state = AppState {
        service: WorkflowService::new(storage),
        identity: Arc::new(identity),
    };

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Workflow sync API routes
        .merge(create_workflow_routes().with_state(app_state));

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // RUST_LOG wins over the configured default filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting flowcanvas server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
