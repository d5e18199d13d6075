use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub const MARKER_KEY: &str = "salonBooking";
pub const RESERVATION_ID_KEY: &str = "reservationId";
pub const CUSTOMER_ID_KEY: &str = "customerId";

/// Event to be written to the external calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEventDraft {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time_zone: String,
    pub reminder_minutes: Vec<u32>,
    pub private_properties: HashMap<String, String>,
}

/// Event as read back from the external calendar. All-day events have no `start`.
#[derive(Debug, Clone, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub private_properties: HashMap<String, String>,
}

impl CalendarEvent {
    pub fn is_salon_event(&self) -> bool {
        self.private_properties.get(MARKER_KEY).map(String::as_str) == Some("true")
    }

    pub fn reservation_id(&self) -> Option<&str> {
        self.private_properties.get(RESERVATION_ID_KEY).map(String::as_str).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SyncReport {
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ImportReport {
    pub total: u32,
    pub imported: u32,
    pub skipped: u32,
    pub errors: u32,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct BidirectionalReport {
    pub created: u32,
    pub updated: u32,
    pub linked: u32,
    pub unchanged: u32,
    pub imported: u32,
    pub errors: u32,
}
