/// flowcanvas: workflow graph builder backend
///
/// Stores directed graphs of typed automation nodes (Start, Condition, Delay,
/// Webhook, Logger, End) and keeps an editor's graph consistent with the stored
/// one through full-replace Create / Update / Read operations.

// Core configuration and setup
pub mod config;

// Caller identity resolution
pub mod auth;

// Workflow graph model, validation, reconciliation, storage and sync protocol
pub mod workflow;

// HTTP API layer - REST endpoints for the sync protocol
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use server::start_server;
pub use workflow::{Edge, GraphSubmission, Node, NodeType, SyncError, Workflow, WorkflowService, WorkflowStorage};
