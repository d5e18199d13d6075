use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminUser;
use crate::api::dtos::requests::{BroadcastRequest, LimitParams, MessageType, SendMessageRequest, TemplateBroadcastRequest};
use crate::api::dtos::responses::SendResponse;
use crate::domain::models::message::{FlexContainer, LineMessage};
use crate::domain::services::dashboard::RECENT_LIMIT;
use crate::domain::services::notifications::{DeliveryRefs, Notification, NotificationKind};
use crate::domain::services::templates::{find_flex_template, render_flex_template, sample_data, FlexTemplate, FLEX_TEMPLATES};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

const DEFAULT_ALT_TEXT: &str = "メッセージが届きました";

fn compose(message: &str, message_type: MessageType, alt_text: Option<String>) -> Result<LineMessage, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".into()));
    }
    match message_type {
        MessageType::Text => Ok(LineMessage::text(message)),
        MessageType::Flex => {
            let contents: FlexContainer = serde_json::from_str(message)
                .map_err(|e| AppError::Validation(format!("Invalid flex message: {}", e)))?;
            let alt_text = alt_text.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| DEFAULT_ALT_TEXT.to_string());
            Ok(LineMessage::flex(alt_text, contents))
        }
    }
}

/// Explicit ids win over a tag, and no selector at all means every customer.
/// Customers without a LINE id stay in the list as blanks so they count as failures.
async fn recipients(state: &AppState, user_ids: Option<Vec<String>>, tag: Option<String>) -> Result<Vec<String>, AppError> {
    if let Some(ids) = user_ids.filter(|ids| !ids.is_empty()) {
        return Ok(ids);
    }
    let customers = match tag.filter(|t| !t.trim().is_empty()) {
        Some(tag) => state.customer_repo.list_by_tag(tag.trim()).await?,
        None => state.customer_repo.list().await?,
    };
    Ok(customers
        .iter()
        .map(|c| c.recipient().unwrap_or_default().to_string())
        .collect())
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = compose(&payload.message, payload.message_type, payload.alt_text)?;
    let notification = Notification::plain(NotificationKind::Manual, message);

    let refs = DeliveryRefs::for_customer(&payload.user_id);
    state.dispatcher().deliver(&payload.user_id, &notification, &refs).await?;
    Ok(Json(SendResponse { success: true }))
}

pub async fn broadcast(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = compose(&payload.message, payload.message_type, payload.alt_text)?;
    let targets = recipients(&state, payload.user_ids, payload.tag).await?;
    info!("Broadcasting {} message to {} recipients", message.channel(), targets.len());

    let notification = Notification::plain(NotificationKind::Broadcast, message);
    let report = state.dispatcher().broadcast(&targets, &notification).await;
    Ok(Json(report))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.messaging.get_profile(&user_id).await?;
    Ok(Json(profile))
}

pub async fn list_message_logs(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(RECENT_LIMIT).clamp(1, 500);
    let logs = state.message_log_repo.list_recent(limit).await?;
    Ok(Json(logs))
}

pub async fn list_templates(_admin: AdminUser) -> impl IntoResponse {
    Json(&FLEX_TEMPLATES)
}

fn require_template(name: &str) -> Result<&'static FlexTemplate, AppError> {
    find_flex_template(name).ok_or_else(|| AppError::NotFound(format!("Template {} not found", name)))
}

pub async fn preview_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let template = require_template(&name)?;
    let contents = render_flex_template(&state.templates, template, &sample_data(template), &state.salon)?;
    Ok(Json(LineMessage::flex(template.title, contents)))
}

pub async fn broadcast_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(name): Path<String>,
    Json(payload): Json<TemplateBroadcastRequest>,
) -> Result<impl IntoResponse, AppError> {
    let template = require_template(&name)?;
    let contents = render_flex_template(&state.templates, template, &payload.data, &state.salon)?;
    let targets = recipients(&state, payload.user_ids, payload.tag).await?;
    info!("Broadcasting template {} to {} recipients", template.name, targets.len());

    let notification = Notification::plain(NotificationKind::Template, LineMessage::flex(template.title, contents));
    let report = state.dispatcher().broadcast(&targets, &notification).await;
    Ok(Json(report))
}
