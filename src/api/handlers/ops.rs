use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminUser;
use crate::api::dtos::requests::{LimitParams, SweepRequest};
use crate::domain::services::clock::today;
use crate::domain::services::sweeps::SweepKind;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

const DEFAULT_JOB_LIMIT: i64 = 50;

/// Runs a scheduled sweep on demand. `date` comes from the body or the query string
/// and defaults to today in the salon's zone.
pub async fn run_sweep(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(kind): Path<String>,
    Query(params): Query<SweepRequest>,
    body: Option<Json<SweepRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let kind: SweepKind = kind.parse()?;
    let date = body
        .and_then(|Json(b)| b.date)
        .or(params.date)
        .unwrap_or_else(|| today(Utc::now(), state.salon.timezone));
    let report = state.sweeps().run(kind, date).await?;
    Ok(Json(report))
}

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_JOB_LIMIT).clamp(1, 500);
    let jobs = state.job_repo.list_recent(limit).await?;
    Ok(Json(jobs))
}
