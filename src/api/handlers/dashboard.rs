use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminUser;
use crate::domain::models::reservation::ReservationFilter;
use crate::domain::services::dashboard::{self, RECENT_LIMIT};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

/// Aggregates are computed over the most recent reservations only.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let filter = ReservationFilter::default();
    let (reservations, customers, staffs) = tokio::try_join!(
        state.reservation_repo.list_recent(&filter, RECENT_LIMIT),
        state.customer_repo.list(),
        state.staff_repo.list_active(),
    )?;

    let summary = dashboard::build(&reservations, &customers, &staffs, Utc::now(), state.salon.timezone);
    Ok(Json(summary))
}
