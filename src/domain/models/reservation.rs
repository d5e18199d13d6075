use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

pub const SOURCE_BOOKING: &str = "booking";
pub const SOURCE_GOOGLE_CALENDAR: &str = "google_calendar";

/// Menu and staff fields are a snapshot taken at booking time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub customer_id: Option<String>,
    pub line_user_id: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub menu_id: Option<String>,
    pub menu_name: String,
    pub menu_price: i64,
    pub menu_duration: Option<i64>,
    pub staff_id: Option<String>,
    pub staff_name: String,
    pub datetime: DateTime<Utc>,
    pub note: String,
    pub status: ReservationStatus,
    pub source: String,
    pub google_event_id: Option<String>,
    pub google_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewReservationParams {
    pub customer_id: Option<String>,
    pub line_user_id: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub menu_id: Option<String>,
    pub menu_name: String,
    pub menu_price: i64,
    pub menu_duration: Option<i64>,
    pub staff_id: Option<String>,
    pub staff_name: String,
    pub datetime: DateTime<Utc>,
    pub note: String,
    pub source: &'static str,
}

impl Reservation {
    pub fn new(params: NewReservationParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: params.customer_id,
            line_user_id: params.line_user_id,
            customer_name: params.customer_name,
            phone: params.phone,
            menu_id: params.menu_id,
            menu_name: params.menu_name,
            menu_price: params.menu_price,
            menu_duration: params.menu_duration,
            staff_id: params.staff_id,
            staff_name: params.staff_name,
            datetime: params.datetime,
            note: params.note,
            status: ReservationStatus::Confirmed,
            source: params.source.to_string(),
            google_event_id: None,
            google_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        self.menu_duration.filter(|d| *d > 0).unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.datetime + Duration::minutes(self.duration_minutes())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }

    /// LINE recipient, if the booking came in through LINE.
    pub fn recipient(&self) -> Option<&str> {
        self.line_user_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub staff_id: Option<String>,
}
