use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::domain::ports::{CalendarService, MessagingService};
use crate::domain::services::templates::load_templates;
use crate::error::AppError;
use crate::infra::google::google_calendar_client::GoogleCalendarClient;
use crate::infra::line::line_messaging_client::LineMessagingClient;
use crate::infra::repositories::{
    sqlite_catalog_repo::{SqliteMenuRepo, SqliteStaffRepo},
    sqlite_customer_repo::SqliteCustomerRepo,
    sqlite_job_repo::SqliteJobRepo,
    sqlite_message_log_repo::SqliteMessageLogRepo,
    sqlite_reservation_repo::SqliteReservationRepo,
};
use crate::state::AppState;

pub async fn connect_sqlite(database_url: &str) -> Result<SqlitePool, AppError> {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    sqlx::migrate!("./migrations/sqlite")
        .run(&pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run SQLite migrations: {}", e)))?;

    Ok(pool)
}

/// Wires repositories over `pool` with the given external services.
pub fn build_state(
    config: &Config,
    pool: SqlitePool,
    messaging: Arc<dyn MessagingService>,
    calendar: Option<Arc<dyn CalendarService>>,
    templates: Arc<Tera>,
) -> AppState {
    AppState {
        config: config.clone(),
        salon: config.salon(),
        reservation_repo: Arc::new(SqliteReservationRepo::new(pool.clone())),
        customer_repo: Arc::new(SqliteCustomerRepo::new(pool.clone())),
        menu_repo: Arc::new(SqliteMenuRepo::new(pool.clone())),
        staff_repo: Arc::new(SqliteStaffRepo::new(pool.clone())),
        message_log_repo: Arc::new(SqliteMessageLogRepo::new(pool.clone())),
        job_repo: Arc::new(SqliteJobRepo::new(pool)),
        messaging,
        calendar,
        templates,
    }
}

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let pool = connect_sqlite(&config.database_url).await?;

    let messaging = Arc::new(LineMessagingClient::new(
        config.line.api_base.clone(),
        config.line.channel_access_token.clone(),
    )?);

    let calendar: Option<Arc<dyn CalendarService>> = match &config.google {
        Some(google) => {
            info!("Google Calendar mirror enabled for calendar {}", google.calendar_id);
            Some(Arc::new(GoogleCalendarClient::new(google.clone())?))
        }
        None => None,
    };

    let templates = Arc::new(load_templates()?);

    Ok(build_state(config, pool, messaging, calendar, templates))
}
