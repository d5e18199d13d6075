use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminUser;
use crate::api::dtos::requests::{CreateReservationRequest, ListReservationsParams, UpdateReservationRequest};
use crate::domain::models::customer::{normalize_birthday, CustomerVisit};
use crate::domain::models::menu::Menu;
use crate::domain::models::reservation::{NewReservationParams, Reservation, ReservationFilter, ReservationStatus, SOURCE_BOOKING};
use crate::domain::models::staff::Staff;
use crate::domain::services::clock::local_to_utc;
use crate::domain::services::dashboard::RECENT_LIMIT;
use crate::domain::services::reservation_service::{creation_jobs, plan_edit, replay_wizard, resolve_contact, ReservationEdit};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn selected_menu(state: &AppState, id: Option<&str>) -> Result<Option<Menu>, AppError> {
    let Some(id) = id else { return Ok(None) };
    let menu = state.menu_repo.find_by_id(id).await?
        .filter(|m| m.active)
        .ok_or(AppError::Validation(format!("Unknown menu {}", id)))?;
    Ok(Some(menu))
}

async fn selected_staff(state: &AppState, id: Option<&str>) -> Result<Option<Staff>, AppError> {
    let Some(id) = id else { return Ok(None) };
    let staff = state.staff_repo.find_by_id(id).await?
        .filter(|s| s.active)
        .ok_or(AppError::Validation(format!("Unknown staff {}", id)))?;
    Ok(Some(staff))
}

pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = non_blank(payload.date)
        .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))?;
    let time = non_blank(payload.time)
        .map(|t| NaiveTime::parse_from_str(&t, "%H:%M"))
        .transpose()
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;

    let menu = selected_menu(&state, payload.menu_id.as_deref()).await?;
    let staff = selected_staff(&state, payload.staff_id.as_deref()).await?;
    let selection = replay_wizard(menu, staff, date, time)?;

    let datetime = local_to_utc(selection.date, selection.time, state.salon.timezone)
        .ok_or(AppError::Validation("Invalid local time (skipped due to DST)".into()))?;
    if datetime < Utc::now() {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let birthday = match non_blank(payload.birthday) {
        Some(raw) => Some(normalize_birthday(&raw)
            .ok_or(AppError::Validation("Birthday must look like MM-DD".into()))?),
        None => None,
    };

    let line_user_id = non_blank(payload.line_user_id);
    let existing = match line_user_id.as_deref() {
        Some(id) => state.customer_repo.find_by_id(id).await?,
        None => None,
    };
    let (customer_name, phone) = resolve_contact(existing.as_ref(), payload.customer_name.as_deref(), payload.phone.as_deref())?;

    let menu = selection.menu;
    let staff = selection.staff;
    let reservation = Reservation::new(NewReservationParams {
        customer_id: line_user_id.clone(),
        line_user_id,
        customer_name,
        phone,
        menu_id: Some(menu.id),
        menu_name: menu.name,
        menu_price: menu.price,
        menu_duration: Some(menu.duration_min),
        staff_id: Some(staff.id),
        staff_name: staff.name,
        datetime,
        note: payload.note.trim().to_string(),
        source: SOURCE_BOOKING,
    });

    let jobs = creation_jobs(&reservation, Utc::now());
    let created = state.reservation_repo.create_with_jobs(&reservation, jobs).await?;
    info!("Reservation {} created for {}", created.id, created.datetime);

    // The reservation stands even when the customer row cannot be written.
    if let Some(customer_id) = created.customer_id.as_deref() {
        let visit = CustomerVisit {
            id: customer_id.to_string(),
            name: created.customer_name.clone(),
            phone: created.phone.clone(),
            birthday,
            reserved_at: created.datetime,
        };
        if let Err(e) = state.customer_repo.record_visit(&visit).await {
            warn!("Failed to upsert customer {} after reservation {}: {:?}", customer_id, created.id, e);
        }
    }

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ListReservationsParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ReservationFilter { status: params.status, staff_id: params.staff_id };
    let reservations = state.reservation_repo.list_recent(&filter, RECENT_LIMIT).await?;
    Ok(Json(reservations))
}

async fn require_reservation(state: &AppState, id: &str) -> Result<Reservation, AppError> {
    state.reservation_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Reservation not found".into()))
}

pub async fn get_reservation(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(require_reservation(&state, &id).await?))
}

async fn apply_edit(state: &AppState, id: &str, edit: ReservationEdit) -> Result<Reservation, AppError> {
    let current = require_reservation(state, id).await?;
    let plan = plan_edit(&current, edit, Utc::now())?;
    if plan.is_noop() {
        return Ok(current);
    }
    let updated = state.reservation_repo.update_with_jobs(&plan.reservation, &plan.cancel_kinds, plan.jobs).await?;
    info!("Reservation {} updated (status {})", updated.id, updated.status.as_str());
    Ok(updated)
}

pub async fn update_reservation(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let edit = ReservationEdit { status: payload.status, datetime: payload.datetime, note: payload.note };
    Ok(Json(apply_edit(&state, &id, edit).await?))
}

/// Cancellation is a status change; rows are never deleted.
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let edit = ReservationEdit { status: Some(ReservationStatus::Cancelled), ..Default::default() };
    Ok(Json(apply_edit(&state, &id, edit).await?))
}
