use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminUser;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub async fn sync_calendar(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let report = state.require_calendar_sync()?.push_all(Utc::now()).await?;
    info!("Calendar push: {} created, {} updated, {} errors", report.created, report.updated, report.errors);
    Ok(Json(report))
}

pub async fn import_calendar(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let report = state.require_calendar_sync()?.import(Utc::now()).await?;
    info!("Calendar import: {}/{} imported", report.imported, report.total);
    Ok(Json(report))
}

pub async fn bidirectional_sync(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let report = state.require_calendar_sync()?.bidirectional(Utc::now()).await?;
    Ok(Json(report))
}
