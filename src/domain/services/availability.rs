use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use crate::domain::models::reservation::Reservation;
use crate::domain::services::clock::local_to_utc;

pub const SLOT_MINUTES: i64 = 30;
const OPEN: (u32, u32) = (10, 0);
const LAST_SLOT: (u32, u32) = (18, 30);
const LIMITED_RATIO: f64 = 0.7;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Available,
    Limited,
    Busy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub taken: usize,
    pub total: usize,
}

/// 10:00 through 18:30, every 30 minutes.
pub fn business_slots() -> Vec<NaiveTime> {
    let open = NaiveTime::from_hms_opt(OPEN.0, OPEN.1, 0).unwrap_or(NaiveTime::MIN);
    let last = NaiveTime::from_hms_opt(LAST_SLOT.0, LAST_SLOT.1, 0).unwrap_or(NaiveTime::MIN);
    let mut slots = Vec::new();
    let mut t = open;
    while t <= last {
        slots.push(t);
        t += Duration::minutes(SLOT_MINUTES);
    }
    slots
}

fn is_taken(slot_start: DateTime<Utc>, reservations: &[Reservation]) -> bool {
    let slot_end = slot_start + Duration::minutes(SLOT_MINUTES);
    reservations
        .iter()
        .filter(|r| !r.is_cancelled())
        .any(|r| r.datetime < slot_end && r.end_time() > slot_start)
}

/// `reservations` are the staff member's bookings for `date`.
pub fn day_slots(date: NaiveDate, tz: Tz, reservations: &[Reservation], now: DateTime<Utc>) -> Vec<SlotAvailability> {
    business_slots()
        .into_iter()
        .map(|time| {
            let available = match local_to_utc(date, time, tz) {
                Some(start) => start > now && !is_taken(start, reservations),
                None => false,
            };
            SlotAvailability { time: time.format("%H:%M").to_string(), available }
        })
        .collect()
}

pub fn day_status(taken: usize, total: usize) -> DayStatus {
    if total == 0 || taken >= total {
        DayStatus::Busy
    } else if taken as f64 / total as f64 >= LIMITED_RATIO {
        DayStatus::Limited
    } else {
        DayStatus::Available
    }
}

pub fn month_availability(days: &[NaiveDate], tz: Tz, reservations: &[Reservation]) -> Vec<DayAvailability> {
    let slots = business_slots();
    days.iter()
        .map(|date| {
            let taken = slots
                .iter()
                .filter_map(|t| local_to_utc(*date, *t, tz))
                .filter(|start| is_taken(*start, reservations))
                .count();
            DayAvailability { date: *date, status: day_status(taken, slots.len()), taken, total: slots.len() }
        })
        .collect()
}
