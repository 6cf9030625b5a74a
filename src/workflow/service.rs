/// Graph sync protocol
///
/// The three operations an editor uses to keep its local graph and the stored
/// graph in step: Create, full-replace Update, and Read (plus the owner listing
/// behind the dashboard). Authorization and validation always finish before the
/// first write; the storage layer makes each write all-or-nothing.

use crate::workflow::{
    error::{AuthorizationError, SyncError},
    storage::WorkflowStorage,
    submission::GraphSubmission,
    types::{Workflow, WorkflowStats, WorkflowSummary},
    validation::validate,
};

/// Entry point for the graph sync operations
#[derive(Debug, Clone)]
pub struct WorkflowService {
    storage: WorkflowStorage,
}

impl WorkflowService {
    pub fn new(storage: WorkflowStorage) -> Self {
        Self { storage }
    }

    /// Create a workflow with its initial graph
    ///
    /// `caller` is the authenticated user. An owner named in the body must be
    /// that same user; when the body names none, the caller becomes the owner.
    pub async fn create(&self, caller: &str, submission: GraphSubmission) -> Result<Workflow, SyncError> {
        if let Some(owner) = submission.owner_id.as_deref() {
            if owner != caller {
                tracing::warn!("🚫 Create rejected: caller {} claimed owner {}", caller, owner);
                return Err(AuthorizationError::NotOwner.into());
            }
        }

        if let Err(e) = validate(&submission) {
            tracing::warn!("❌ Create rejected for {}: {}", caller, e);
            return Err(e.into());
        }

        let workflow = self
            .storage
            .create_workflow_with_graph(caller, &submission)
            .await
            .map_err(|e| SyncError::from_storage("<new>", e))?;

        tracing::info!(
            "🔥 Created workflow: {} ({}) with {} nodes and {} edges",
            workflow.id,
            workflow.name,
            workflow.nodes.len(),
            workflow.edges.len()
        );

        Ok(workflow)
    }

    /// Replace a workflow's name, description and entire graph
    ///
    /// Node and edge ids are regenerated on every call, even when the submitted
    /// graph is identical to the stored one.
    pub async fn update(
        &self,
        caller: &str,
        workflow_id: &str,
        submission: GraphSubmission,
    ) -> Result<Workflow, SyncError> {
        let owner = self
            .storage
            .find_owner(workflow_id)
            .await
            .map_err(|e| SyncError::from_storage(workflow_id, e))?
            .ok_or_else(|| SyncError::NotFound(workflow_id.to_string()))?;

        if owner != caller {
            tracing::warn!("🚫 Update of {} rejected: caller {} is not the owner", workflow_id, caller);
            return Err(AuthorizationError::NotOwner.into());
        }

        if let Err(e) = validate(&submission) {
            tracing::warn!("❌ Update of {} rejected: {}", workflow_id, e);
            return Err(e.into());
        }

        let workflow = self
            .storage
            .replace_nodes_and_edges(workflow_id, caller, &submission)
            .await
            .map_err(|e| SyncError::from_storage(workflow_id, e))?;

        tracing::info!(
            "🔥 Replaced graph of workflow: {} ({}) with {} nodes and {} edges",
            workflow.id,
            workflow.name,
            workflow.nodes.len(),
            workflow.edges.len()
        );

        Ok(workflow)
    }

    /// Read a workflow with its full graph
    pub async fn read(&self, workflow_id: &str) -> Result<Workflow, SyncError> {
        self.storage
            .find_workflow_with_graph(workflow_id)
            .await
            .map_err(|e| SyncError::from_storage(workflow_id, e))?
            .ok_or_else(|| SyncError::NotFound(workflow_id.to_string()))
    }

    /// The caller's workflows, newest first, at most `limit` of them
    pub async fn list(&self, caller: &str, limit: Option<u32>) -> Result<Vec<WorkflowSummary>, SyncError> {
        self.storage
            .list_workflows_for_owner(caller, limit)
            .await
            .map_err(SyncError::Persistence)
    }

    /// Dashboard totals for the caller
    pub async fn stats(&self, caller: &str) -> Result<WorkflowStats, SyncError> {
        let stats = self
            .storage
            .workflow_stats_for_owner(caller)
            .await
            .map_err(SyncError::Persistence)?;

        tracing::debug!(
            "📊 Stats for {}: {} workflows ({} active), {} nodes",
            caller,
            stats.workflow_count,
            stats.active_workflows,
            stats.total_nodes
        );

        Ok(stats)
    }
}
