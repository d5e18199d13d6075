use chrono::{DateTime, Datelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use crate::domain::models::reservation::Reservation;
use crate::domain::models::salon::SalonProfile;

pub fn weekday_ja(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}

/// `2025年1月10日金曜日`
pub fn format_date_ja(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    format!("{}年{}月{}日{}曜日", local.year(), local.month(), local.day(), weekday_ja(local.weekday()))
}

/// `14:00`
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// `¥4,000`
pub fn format_price(yen: i64) -> String {
    let digits = yen.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if yen < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

/// Display strings for a reservation, shared by flex bubbles and text fallbacks.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationView {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub menu: String,
    pub staff: String,
    pub price: String,
    pub duration: i64,
    pub note: String,
    pub salon: String,
    pub reservation_url: String,
    pub booking_url: String,
    pub dashboard_url: String,
}

impl ReservationView {
    pub fn new(reservation: &Reservation, salon: &SalonProfile) -> Self {
        Self {
            id: reservation.id.clone(),
            name: reservation.customer_name.clone(),
            date: format_date_ja(reservation.datetime, salon.timezone),
            time: format_time(reservation.datetime, salon.timezone),
            menu: reservation.menu_name.clone(),
            staff: reservation.staff_name.clone(),
            price: format_price(reservation.menu_price),
            duration: reservation.duration_minutes(),
            note: reservation.note.clone(),
            salon: salon.name.clone(),
            reservation_url: salon.reservation_url(&reservation.id),
            booking_url: salon.booking_url(),
            dashboard_url: salon.dashboard_url(),
        }
    }

    pub fn when(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}
