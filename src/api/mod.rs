/// HTTP API Layer
///
/// REST endpoints for the workflow graph sync protocol:
/// - Create, replace, read and list workflows
/// - Mapping of protocol errors onto HTTP status codes

// Workflow management endpoints (POST/GET/PUT)
pub mod workflows;

// Error responses
pub mod error;

// Re-export router builder
pub use workflows::{create_workflow_routes, AppState};
