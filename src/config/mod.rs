/// Configuration management for the flowcanvas server
///
/// Handles server binding, the workflow database location, caller identity
/// extraction, and the log filter.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Caller identity configuration
    pub auth: AuthConfig,
    /// Default tracing filter directive, used when RUST_LOG is unset
    pub log_filter: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration for workflow graph storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the SQLite file (default: "data")
    /// Creates: {data_dir}/workflows.db
    pub data_dir: String,
    /// Upper bound on pooled SQLite connections
    pub max_connections: u32,
}

/// Identity configuration
///
/// Session issuance lives outside this service; an upstream gateway resolves the
/// session and forwards the user id in a trusted header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the authenticated user id
    pub user_header: String,
}

impl DatabaseConfig {
    /// Full path of the workflow database file
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join("workflows.db")
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("FLOWCANVAS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FLOWCANVAS_PORT")
                    .unwrap_or_else(|_| "3004".to_string())
                    .parse()
                    .unwrap_or(3004),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("FLOWCANVAS_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
                max_connections: std::env::var("FLOWCANVAS_DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
            auth: AuthConfig {
                user_header: std::env::var("FLOWCANVAS_USER_HEADER")
                    .unwrap_or_else(|_| "x-user-id".to_string()),
            },
            log_filter: std::env::var("FLOWCANVAS_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
