//! Notebook reads: full history, one notebook, clear, and the SSE change feed.

use super::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use notebook_core::{HistoryEvent, HistorySnapshot};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;

/// GET /api/history – category -> answers, newest first.
pub(crate) async fn all(State(state): State<AppState>) -> Json<HistorySnapshot> {
    let snapshot = state.query.fetch_history();
    tracing::debug!(
        target: "notebook::gateway",
        notebooks = snapshot.categories().count(),
        entries = snapshot.total_entries(),
        "History served"
    );
    Json(snapshot)
}

/// GET /api/history/:category – one notebook, 404 when it has no entries.
pub(crate) async fn notebook(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Response {
    match state.query.fetch_notebook(&category) {
        Some(entries) => Json(entries).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "status": "error",
                "error": format!("notebook '{}' not found", category),
            })),
        )
            .into_response(),
    }
}

/// DELETE /api/history – drops every notebook.
pub(crate) async fn clear(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state.query.clear_history()?;
    Ok(Json(serde_json::json!({ "status": "cleared", "removed": removed })))
}

/// GET /api/history/stream – Server-Sent Events for every append and clear.
pub(crate) async fn stream(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    use async_stream::stream;
    let mut rx = state.query.store().subscribe();
    let stream = stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let name = match &event {
                        HistoryEvent::Appended { .. } => "appended",
                        HistoryEvent::Cleared { .. } => "cleared",
                    };
                    match Event::default().event(name).json_data(&event) {
                        Ok(sse) => yield Ok(sse),
                        Err(e) => tracing::warn!(target: "notebook::gateway", error = %e, "Dropping unencodable history event"),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    yield Ok(Event::default().event("lagged").data(format!("{} history events dropped; refetch /api/history", n)));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}
