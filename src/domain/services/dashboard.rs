use std::collections::HashMap;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use crate::domain::models::customer::Customer;
use crate::domain::models::reservation::{Reservation, ReservationStatus};
use crate::domain::models::staff::Staff;
use crate::domain::services::format::format_time;

pub const RECENT_LIMIT: i64 = 100;
pub const REFRESH_INTERVAL_SECS: u64 = 30;
const POPULAR_MENU_COUNT: usize = 5;
const DAILY_SALES_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub time: String,
    pub customer_name: String,
    pub menu_name: String,
    pub staff_name: String,
    pub status: ReservationStatus,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: i64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct StatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MenuStat {
    pub name: String,
    pub count: usize,
    pub revenue: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadLevel {
    Available,
    Busy,
    Full,
}

impl LoadLevel {
    pub fn from_count(count: usize) -> Self {
        match count {
            0..3 => LoadLevel::Available,
            3..6 => LoadLevel::Busy,
            _ => LoadLevel::Full,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffLoad {
    pub staff_id: String,
    pub name: String,
    pub count: usize,
    pub level: LoadLevel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today_schedule: Vec<ScheduleEntry>,
    pub today_count: usize,
    pub today_sales: i64,
    pub month_revenue: i64,
    pub daily_sales: Vec<DailySales>,
    pub status_counts: StatusCounts,
    pub new_customers_this_month: usize,
    pub popular_menus: Vec<MenuStat>,
    pub staff_load: Vec<StaffLoad>,
    pub refresh_interval_secs: u64,
}

fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub fn popular_menus(month: &[&Reservation]) -> Vec<MenuStat> {
    let mut by_name: HashMap<&str, (usize, i64)> = HashMap::new();
    for r in month {
        let entry = by_name.entry(r.menu_name.as_str()).or_default();
        entry.0 += 1;
        entry.1 += r.menu_price;
    }
    let mut stats: Vec<MenuStat> = by_name
        .into_iter()
        .map(|(name, (count, revenue))| MenuStat { name: name.to_string(), count, revenue })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then(b.revenue.cmp(&a.revenue)).then(a.name.cmp(&b.name)));
    stats.truncate(POPULAR_MENU_COUNT);
    stats
}

pub fn status_counts(reservations: &[Reservation]) -> StatusCounts {
    reservations.iter().fold(StatusCounts::default(), |mut acc, r| {
        match r.status {
            ReservationStatus::Pending => acc.pending += 1,
            ReservationStatus::Confirmed => acc.confirmed += 1,
            ReservationStatus::Completed => acc.completed += 1,
            ReservationStatus::Cancelled => acc.cancelled += 1,
        }
        acc
    })
}

pub fn build(
    reservations: &[Reservation],
    customers: &[Customer],
    staffs: &[Staff],
    now: DateTime<Utc>,
    tz: Tz,
) -> Dashboard {
    let today = local_date(now, tz);
    let active: Vec<&Reservation> = reservations.iter().filter(|r| !r.is_cancelled()).collect();

    let mut todays: Vec<&Reservation> = active.iter().copied().filter(|r| local_date(r.datetime, tz) == today).collect();
    todays.sort_by_key(|r| r.datetime);

    let this_month: Vec<&Reservation> = active
        .iter()
        .copied()
        .filter(|r| same_month(local_date(r.datetime, tz), today))
        .collect();

    let daily_sales = (0..DAILY_SALES_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let sales = active.iter().filter(|r| local_date(r.datetime, tz) == date).map(|r| r.menu_price).sum();
            DailySales { date, sales }
        })
        .collect();

    let staff_load = staffs
        .iter()
        .filter(|s| s.active)
        .map(|s| {
            let count = todays.iter().filter(|r| r.staff_id.as_deref() == Some(s.id.as_str())).count();
            StaffLoad { staff_id: s.id.clone(), name: s.name.clone(), count, level: LoadLevel::from_count(count) }
        })
        .collect();

    Dashboard {
        today_count: todays.len(),
        today_sales: todays.iter().map(|r| r.menu_price).sum(),
        today_schedule: todays
            .iter()
            .map(|r| ScheduleEntry {
                id: r.id.clone(),
                time: format_time(r.datetime, tz),
                customer_name: r.customer_name.clone(),
                menu_name: r.menu_name.clone(),
                staff_name: r.staff_name.clone(),
                status: r.status,
            })
            .collect(),
        month_revenue: this_month.iter().map(|r| r.menu_price).sum(),
        daily_sales,
        status_counts: status_counts(reservations),
        new_customers_this_month: customers
            .iter()
            .filter(|c| same_month(local_date(c.created_at, tz), today))
            .count(),
        popular_menus: popular_menus(&this_month),
        staff_load,
        refresh_interval_secs: REFRESH_INTERVAL_SECS,
    }
}
