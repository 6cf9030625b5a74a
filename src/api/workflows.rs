/// Workflow REST API endpoints
///
/// HTTP face of the graph sync protocol. Create and Update take the complete
/// desired graph; there is no partial update.

use crate::{
    auth::IdentityProvider,
    workflow::{
        error::{AuthorizationError, SyncError},
        service::WorkflowService,
        submission::GraphSubmission,
        types::{Workflow, WorkflowStats, WorkflowSummary},
    },
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Sync protocol operations over workflow storage
    pub service: WorkflowService,
    /// Resolves the calling user
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    fn require_caller(&self, headers: &HeaderMap) -> Result<String, SyncError> {
        self.identity
            .current_user_id(headers)
            .ok_or(SyncError::Authorization(AuthorizationError::Unauthenticated))
    }
}

/// Query parameters for listing workflows
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Return at most this many workflows (the dashboard asks for 5)
    pub limit: Option<u32>,
}

/// Create workflow management routes
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows", post(create_workflow).get(list_workflows))
        .route("/api/workflows/stats", get(workflow_stats))
        .route("/api/workflows/{id}", get(get_workflow).put(update_workflow))
}

/// Create a new workflow
///
/// POST /api/workflows
/// Body: { "name": "...", "description": "...", "ownerId": "...", "nodes": [...], "edges": [...] }
/// Returns 201 with the stored workflow, node and edge ids replaced by durable ones.
async fn create_workflow(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Workflow>), SyncError> {
    let caller = state.require_caller(&headers)?;
    let submission = GraphSubmission::from_body(&body)?;

    let workflow = state.service.create(&caller, submission).await?;
    Ok((StatusCode::CREATED, Json(workflow)))
}

/// List the caller's workflows
///
/// GET /api/workflows?limit=5
/// Returns: { "workflows": [{ "id", "name", "nodeCount", ... }] }
async fn list_workflows(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, SyncError> {
    let caller = state.require_caller(&headers)?;
    let workflows: Vec<WorkflowSummary> = state.service.list(&caller, query.limit).await?;
    Ok(Json(serde_json::json!({ "workflows": workflows })))
}

/// Dashboard totals for the caller
///
/// GET /api/workflows/stats
/// Returns: { "workflowCount": 3, "activeWorkflows": 1, "totalNodes": 12 }
async fn workflow_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WorkflowStats>, SyncError> {
    let caller = state.require_caller(&headers)?;
    Ok(Json(state.service.stats(&caller).await?))
}

/// Get a specific workflow by ID
///
/// GET /api/workflows/{id}
/// Returns: { "id": "...", "name": "...", "nodes": [...], "edges": [...] }
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, SyncError> {
    Ok(Json(state.service.read(&id).await?))
}

/// Replace an existing workflow
///
/// PUT /api/workflows/{id}
/// Body: same shape as create; the lists are the complete new graph.
async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Workflow>, SyncError> {
    let caller = state.require_caller(&headers)?;
    let submission = GraphSubmission::from_body(&body)?;

    Ok(Json(state.service.update(&caller, &id, submission).await?))
}
