//! POST /api/research: submit a question, get the stored answer back.

use super::ApiError;
use crate::AppState;
use axum::extract::{Json, State};
use notebook_core::ResearchAnswer;
use std::sync::Arc;
use std::time::Instant;

#[derive(serde::Deserialize)]
pub(crate) struct ResearchRequest {
    /// Missing field is treated like an empty question (400), not a decode failure.
    #[serde(default)]
    question: String,
}

pub(crate) async fn submit(
    State(state): State<AppState>,
    Json(req): Json<ResearchRequest>,
) -> Result<Json<Arc<ResearchAnswer>>, ApiError> {
    let started = Instant::now();
    tracing::info!(
        target: "notebook::gateway",
        question_len = req.question.len(),
        "Research request received"
    );

    let answer = state.query.submit_question(&req.question).await?;

    tracing::info!(
        target: "notebook::gateway",
        category = %answer.category,
        findings = answer.findings.len(),
        sources = answer.sources.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Research response sent"
    );
    Ok(Json(answer))
}
