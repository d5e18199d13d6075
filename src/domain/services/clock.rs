use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolves a wall-clock time in the salon's zone; DST gaps yield `None`.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `[00:00 of date, 00:00 of date + days)` in the salon's zone.
pub fn day_bounds(date: NaiveDate, days: i64, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_to_utc(date, NaiveTime::MIN, tz)
        .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    let end_date = date + Duration::days(days);
    let end = local_to_utc(end_date, NaiveTime::MIN, tz)
        .unwrap_or_else(|| Utc.from_utc_datetime(&end_date.and_time(NaiveTime::MIN)));
    (start, end)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_bounds(year: i32, month: u32, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    let days = (next - first).num_days();
    Some(day_bounds(first, days, tz))
}

pub fn days_in_month(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(first.iter_days().take_while(|d| *d < next).collect())
}

pub fn today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Parses `YYYY-MM`.
pub fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (y, m) = raw.trim().split_once('-')?;
    let year: i32 = y.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokyo_day_starts_at_fifteen_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let (start, end) = day_bounds(date, 1, chrono_tz::Asia::Tokyo);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 11, 15, 0, 0).unwrap());
    }

    #[test]
    fn month_helpers() {
        assert_eq!(days_in_month(2024, 2).unwrap().len(), 29);
        assert_eq!(parse_month("2025-01"), Some((2025, 1)));
        assert_eq!(parse_month("2025-13"), None);
        let (start, end) = month_bounds(2025, 12, chrono_tz::UTC).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }
}
