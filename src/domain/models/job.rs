use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_FAILED: &str = "FAILED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    NotifyConfirmation,
    NotifyStaff,
    NotifyCancellation,
    Reminder1h,
    CalendarCreate,
    CalendarUpdate,
    CalendarDelete,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::NotifyConfirmation => "NOTIFY_CONFIRMATION",
            JobKind::NotifyStaff => "NOTIFY_STAFF",
            JobKind::NotifyCancellation => "NOTIFY_CANCELLATION",
            JobKind::Reminder1h => "REMINDER_1H",
            JobKind::CalendarCreate => "CALENDAR_CREATE",
            JobKind::CalendarUpdate => "CALENDAR_UPDATE",
            JobKind::CalendarDelete => "CALENDAR_DELETE",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOTIFY_CONFIRMATION" => Ok(JobKind::NotifyConfirmation),
            "NOTIFY_STAFF" => Ok(JobKind::NotifyStaff),
            "NOTIFY_CANCELLATION" => Ok(JobKind::NotifyCancellation),
            "REMINDER_1H" => Ok(JobKind::Reminder1h),
            "CALENDAR_CREATE" => Ok(JobKind::CalendarCreate),
            "CALENDAR_UPDATE" => Ok(JobKind::CalendarUpdate),
            "CALENDAR_DELETE" => Ok(JobKind::CalendarDelete),
            other => Err(format!("unknown job type {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobPayload {
    pub reservation_id: String,
    /// Carried by CALENDAR_DELETE, since the reservation row no longer holds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_event_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub job_type: String,
    pub payload: Json<JobPayload>,
    pub execute_at: DateTime<Utc>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(kind: JobKind, reservation_id: String, execute_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_type: kind.as_str().to_string(),
            payload: Json(JobPayload { reservation_id, google_event_id: None }),
            execute_at,
            status: STATUS_PENDING.to_string(),
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn now(kind: JobKind, reservation_id: &str) -> Self {
        Self::new(kind, reservation_id.to_string(), Utc::now())
    }

    pub fn calendar_delete(reservation_id: &str, google_event_id: String) -> Self {
        let mut job = Self::now(JobKind::CalendarDelete, reservation_id);
        job.payload.0.google_event_id = Some(google_event_id);
        job
    }

    pub fn kind(&self) -> Result<JobKind, String> {
        self.job_type.parse()
    }
}
