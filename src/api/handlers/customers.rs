use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminUser;
use crate::api::dtos::responses::CustomerExistsResponse;
use crate::domain::models::customer::{normalize_birthday, CustomerDetail, CustomerUpdate};
use crate::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;

/// Lets the booking page skip the contact step for returning customers.
pub async fn customer_exists(
    State(state): State<Arc<AppState>>,
    Path(line_user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exists = state.customer_repo.find_by_id(&line_user_id).await?.is_some();
    Ok(Json(CustomerExistsResponse { exists }))
}

pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let customers = state.customer_repo.list().await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.customer_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Customer not found".into()))?;
    let reservations = state.reservation_repo.history_for_customer(&customer.id).await?;
    Ok(Json(CustomerDetail { customer, reservations }))
}

pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(mut payload): Json<CustomerUpdate>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(raw) = payload.birthday.take() {
        payload.birthday = if raw.trim().is_empty() {
            Some(String::new())
        } else {
            Some(normalize_birthday(&raw).ok_or(AppError::Validation("Birthday must look like MM-DD".into()))?)
        };
    }
    if let Some(tags) = payload.tags.take() {
        let mut seen = HashSet::new();
        let tags: Vec<String> = tags.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        payload.tags = Some(tags);
    }

    let updated = state.customer_repo.update(&id, &payload).await?;
    Ok(Json(updated))
}
