use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, catalog, customers, reservations, dashboard, messaging, calendar, ops};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
    cors::CorsLayer,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public booking page
        .route("/api/v1/menus", get(catalog::list_menus))
        .route("/api/v1/staffs", get(catalog::list_staffs))
        .route("/api/v1/staffs/{id}/slots", get(catalog::get_staff_slots))
        .route("/api/v1/staffs/{id}/availability", get(catalog::get_staff_availability))
        .route("/api/v1/customers/{line_user_id}/exists", get(customers::customer_exists))
        .route("/api/v1/reservations", post(reservations::create_reservation))

        // Admin - Reservations
        .route("/api/v1/admin/reservations", get(reservations::list_reservations))
        .route("/api/v1/admin/reservations/{id}", get(reservations::get_reservation).put(reservations::update_reservation).delete(reservations::cancel_reservation))

        // Admin - Customers
        .route("/api/v1/admin/customers", get(customers::list_customers))
        .route("/api/v1/admin/customers/{id}", get(customers::get_customer).put(customers::update_customer))

        // Admin - Catalog
        .route("/api/v1/admin/menus", post(catalog::create_menu))
        .route("/api/v1/admin/menus/{id}", put(catalog::update_menu))
        .route("/api/v1/admin/staffs", post(catalog::create_staff))
        .route("/api/v1/admin/staffs/{id}", put(catalog::update_staff))

        .route("/api/v1/admin/dashboard", get(dashboard::get_dashboard))

        // Admin - Messaging
        .route("/api/v1/admin/messages/send", post(messaging::send_message))
        .route("/api/v1/admin/messages/broadcast", post(messaging::broadcast))
        .route("/api/v1/admin/messages/profile/{user_id}", get(messaging::get_profile))
        .route("/api/v1/admin/messages/logs", get(messaging::list_message_logs))
        .route("/api/v1/admin/messages/templates", get(messaging::list_templates))
        .route("/api/v1/admin/messages/templates/{name}/preview", get(messaging::preview_template))
        .route("/api/v1/admin/messages/templates/{name}/broadcast", post(messaging::broadcast_template))

        // Admin - Google Calendar
        .route("/api/v1/admin/calendar/sync", post(calendar::sync_calendar))
        .route("/api/v1/admin/calendar/import", post(calendar::import_calendar))
        .route("/api/v1/admin/calendar/bidirectional", post(calendar::bidirectional_sync))

        // Admin - Operations
        .route("/api/v1/admin/sweeps/{kind}", post(ops::run_sweep))
        .route("/api/v1/admin/jobs", get(ops::list_jobs))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        // The booking page and dashboard are static pages served from APP_URL.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
