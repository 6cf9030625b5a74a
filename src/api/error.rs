/// HTTP mapping for sync protocol errors

use crate::workflow::error::{AuthorizationError, SyncError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

impl SyncError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SyncError::Validation(_) => StatusCode::BAD_REQUEST,
            SyncError::NotFound(_) => StatusCode::NOT_FOUND,
            SyncError::Authorization(AuthorizationError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            SyncError::Authorization(AuthorizationError::NotOwner) => StatusCode::FORBIDDEN,
            SyncError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage details stay in the logs.
        let message = match &self {
            SyncError::Persistence(e) => {
                tracing::error!("❌ Persistence failure: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
