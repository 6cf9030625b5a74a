/// flowcanvas: workflow graph builder backend
///
/// Main entry point. Loads configuration from the environment and starts the
/// HTTP server.

use flowcanvas::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow graph sync API at /api/workflows/*
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Defaults to 0.0.0.0:3004 and data/workflows.db
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
