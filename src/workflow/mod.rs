/// Workflow Management Layer
///
/// This module holds the workflow graph model and everything needed to keep an
/// editor's graph and the stored graph consistent:
/// - Type definitions (Workflow, Node, Edge) and typed node payloads
/// - Request decoding, validation and identifier reconciliation
/// - SQLite persistence with sqlx
/// - The Create / Update / Read sync protocol

// Core workflow type definitions
pub mod types;

// Per-node-type data payloads
pub mod payload;

// Create/Update request decoding
pub mod submission;

// Graph invariant checks
pub mod validation;

// Local -> durable node id remapping
pub mod reconcile;

// Error taxonomy
pub mod error;

// SQLite pool construction
pub mod database;

// SQLite persistence layer for workflow graphs
pub mod storage;

// Sync protocol operations
pub mod service;

// Re-export commonly used types
pub use error::{AuthorizationError, StorageError, SyncError, ValidationError};
pub use payload::NodeData;
pub use service::WorkflowService;
pub use storage::WorkflowStorage;
pub use submission::GraphSubmission;
pub use types::{Edge, Node, NodeType, Workflow, WorkflowStats, WorkflowSummary};
