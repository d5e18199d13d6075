use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::warn;

/// Admin endpoints expect `Authorization: Bearer {ADMIN_TOKEN}`.
pub struct AdminUser;

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts.headers.get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        if token.trim() != app_state.config.admin_token {
            warn!("Rejected admin request with an invalid token");
            return Err(AppError::Unauthorized);
        }

        Ok(AdminUser)
    }
}
