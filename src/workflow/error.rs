/// Error taxonomy for the graph sync protocol
///
/// Validation and authorization failures are the caller's fault and are
/// reported back; storage failures are logged and surface as a generic error.

use serde_json::error::Category;
use thiserror::Error;

use crate::workflow::reconcile::DanglingReference;

/// A submitted graph is malformed or violates a graph invariant.
///
/// Always reported back to the caller; never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(String),

    /// Well-formed JSON that does not describe a workflow graph
    #[error("invalid workflow graph: {0}")]
    InvalidBody(String),

    #[error("workflow name is required and must be a non-empty string")]
    MissingName,

    #[error("node id '{0}' is used more than once")]
    DuplicateNodeId(String),

    #[error("a workflow may contain at most one start node (found '{first}' and '{second}')")]
    MultipleStartNodes { first: String, second: String },

    #[error(transparent)]
    DanglingReference(#[from] DanglingReference),
}

/// The caller may not perform the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("caller does not own this workflow")]
    NotOwner,
}

/// Failure inside the persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("failed to encode node payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("stored node '{node_id}' is unreadable: {reason}")]
    CorruptNode { node_id: String, reason: String },

    #[error("workflow not found")]
    NotFound,

    /// The graph was rejected while the transaction was open; nothing was committed.
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

/// Outcome of a failed Create, Update, Read or List call.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("workflow '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("persistence failure: {0}")]
    Persistence(#[source] StorageError),
}

impl ValidationError {
    /// Classify a request body decoding failure
    pub fn from_decode(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => ValidationError::MalformedBody(err.to_string()),
            Category::Data => ValidationError::InvalidBody(err.to_string()),
        }
    }
}

impl SyncError {
    /// Lift a storage failure for the given workflow into the protocol taxonomy
    pub fn from_storage(workflow_id: &str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound => SyncError::NotFound(workflow_id.to_string()),
            StorageError::Rejected(v) => SyncError::Validation(v),
            other => SyncError::Persistence(other),
        }
    }
}
