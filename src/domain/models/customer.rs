use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use super::reservation::ReservationStatus;

/// Keyed by the customer's LINE user id.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub line_user_id: Option<String>,
    /// `MM-DD`
    pub birthday: Option<String>,
    pub tags: Json<Vec<String>>,
    pub last_reservation: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn recipient(&self) -> Option<&str> {
        self.line_user_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.0.iter().any(|t| t == tag)
    }
}

/// Values written by the booking path on every new reservation.
#[derive(Debug, Clone)]
pub struct CustomerVisit {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub birthday: Option<String>,
    pub reserved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub datetime: DateTime<Utc>,
    pub menu: String,
    pub staff: String,
    pub price: i64,
    pub note: String,
    pub status: ReservationStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub reservations: Vec<HistoryEntry>,
}

/// Accepts `MM-DD`, `M-D` or `M/D` and normalizes to `MM-DD`.
pub fn normalize_birthday(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (m, d) = trimmed.split_once(['-', '/'])?;
    let month: u32 = m.parse().ok()?;
    let day: u32 = d.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{:02}-{:02}", month, day))
}
