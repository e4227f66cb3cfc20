use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

/// Recent notification jobs, newest first. Operational visibility into the
/// confirmation/reminder pipeline.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let jobs = state.job_repo.list_jobs().await?;
    Ok(Json(jobs))
}
