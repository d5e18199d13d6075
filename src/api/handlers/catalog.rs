use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminUser;
use crate::api::dtos::requests::{
    AvailabilityParams, CreateMenuRequest, CreateStaffRequest, SlotsParams, UpdateMenuRequest, UpdateStaffRequest,
};
use crate::api::dtos::responses::{MonthAvailabilityResponse, SlotsResponse};
use crate::domain::models::{menu::Menu, staff::Staff};
use crate::domain::services::availability::{day_slots, month_availability};
use crate::domain::services::clock::{day_bounds, days_in_month, month_bounds, parse_month};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub async fn list_menus(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let menus = state.menu_repo.list_active().await?;
    Ok(Json(menus))
}

pub async fn list_staffs(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let staffs = state.staff_repo.list_active().await?;
    Ok(Json(staffs))
}

fn require_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    Ok(name.to_string())
}

fn require_non_negative(field: &str, value: i64) -> Result<i64, AppError> {
    if value < 0 {
        return Err(AppError::Validation(format!("{} must not be negative", field)));
    }
    Ok(value)
}

pub async fn create_menu(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateMenuRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.duration_min <= 0 {
        return Err(AppError::Validation("Duration must be positive".into()));
    }
    let menu = Menu::new(
        require_name(&payload.name)?,
        require_non_negative("Price", payload.price)?,
        payload.duration_min,
        payload.description,
        payload.sort_order,
    );
    let created = state.menu_repo.create(&menu).await?;
    info!("Created menu {} ({})", created.name, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_menu(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMenuRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut menu = state.menu_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Menu not found".into()))?;

    if let Some(name) = payload.name { menu.name = require_name(&name)?; }
    if let Some(price) = payload.price { menu.price = require_non_negative("Price", price)?; }
    if let Some(duration) = payload.duration_min {
        if duration <= 0 {
            return Err(AppError::Validation("Duration must be positive".into()));
        }
        menu.duration_min = duration;
    }
    if let Some(description) = payload.description { menu.description = description; }
    if let Some(sort_order) = payload.sort_order { menu.sort_order = sort_order; }
    if let Some(active) = payload.active { menu.active = active; }

    let updated = state.menu_repo.update(&menu).await?;
    Ok(Json(updated))
}

pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    let line_user_id = payload.line_user_id.filter(|id| !id.trim().is_empty());
    let staff = Staff::new(
        require_name(&payload.name)?,
        payload.role,
        payload.specialty,
        line_user_id,
        payload.sort_order,
    );
    let created = state.staff_repo.create(&staff).await?;
    info!("Created staff {} ({})", created.name, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_staff(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut staff = state.staff_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Staff not found".into()))?;

    if let Some(name) = payload.name { staff.name = require_name(&name)?; }
    if let Some(role) = payload.role { staff.role = role; }
    if let Some(specialty) = payload.specialty { staff.specialty = specialty; }
    if let Some(line_user_id) = payload.line_user_id {
        staff.line_user_id = Some(line_user_id).filter(|id| !id.trim().is_empty());
    }
    if let Some(sort_order) = payload.sort_order { staff.sort_order = sort_order; }
    if let Some(active) = payload.active { staff.active = active; }

    let updated = state.staff_repo.update(&staff).await?;
    Ok(Json(updated))
}

async fn require_staff(state: &AppState, id: &str) -> Result<Staff, AppError> {
    state.staff_repo.find_by_id(id).await?
        .filter(|s| s.active)
        .ok_or(AppError::NotFound("Staff not found".into()))
}

pub async fn get_staff_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<SlotsParams>,
) -> Result<impl IntoResponse, AppError> {
    let staff = require_staff(&state, &id).await?;
    let tz = state.salon.timezone;

    let (start, end) = day_bounds(params.date, 1, tz);
    let reservations = state.reservation_repo.list_active_for_staff(&staff.id, start, end).await?;

    Ok(Json(SlotsResponse {
        date: params.date,
        staff_id: staff.id,
        slots: day_slots(params.date, tz, &reservations, Utc::now()),
    }))
}

pub async fn get_staff_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<AvailabilityParams>,
) -> Result<impl IntoResponse, AppError> {
    let staff = require_staff(&state, &id).await?;
    let tz = state.salon.timezone;

    let (year, month) = parse_month(&params.month)
        .ok_or(AppError::Validation("Month must be YYYY-MM".into()))?;
    let days = days_in_month(year, month)
        .ok_or(AppError::Validation("Month out of range".into()))?;
    let (start, end) = month_bounds(year, month, tz)
        .ok_or(AppError::Validation("Month out of range".into()))?;

    let reservations = state.reservation_repo.list_active_for_staff(&staff.id, start, end).await?;

    Ok(Json(MonthAvailabilityResponse {
        month: params.month,
        staff_id: staff.id,
        days: month_availability(&days, tz, &reservations),
    }))
}
