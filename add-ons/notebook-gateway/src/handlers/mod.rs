//! Route handlers. `research` owns the submission path, `history` the notebook reads.

pub(crate) mod history;
pub(crate) mod research;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notebook_core::BoundaryError;

/// Boundary error rendered as `{ status: "error", kind, error }` with its HTTP status.
pub(crate) struct ApiError(pub(crate) BoundaryError);

impl From<BoundaryError> for ApiError {
    fn from(err: BoundaryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({
            "status": "error",
            "kind": self.0.kind,
            "error": self.0.message,
        });
        (status, Json(body)).into_response()
    }
}
