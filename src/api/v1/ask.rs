//! Question answering endpoint

use std::time::Instant;

use axum::extract::State;
use tracing::{error, info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, AskRequest, AskResponse, Json};

/// POST /v1/ask
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::bad_request("Question cannot be empty").with_param("question"));
    }

    let start = Instant::now();

    let outcome = state.engine.run(&request.question).await.map_err(|e| {
        if e.is_unavailable() {
            warn!(error = %e, "Backend unavailable, question not answered");
        } else {
            error!(error = %e, "Question could not be answered");
        }
        ApiError::from(e)
    })?;

    info!(
        retry_count = outcome.retry_count,
        relevant = outcome.relevant_passages.len(),
        terminal = ?outcome.terminal,
        forced = outcome.forced,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Answered question"
    );

    Ok(Json(AskResponse::from(outcome)))
}
