use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use chrono::{DateTime, Duration, Months, Utc};
use tracing::{info, warn};
use crate::domain::models::calendar::{
    BidirectionalReport, CalendarEvent, CalendarEventDraft, ImportReport, SyncReport,
    CUSTOMER_ID_KEY, MARKER_KEY, RESERVATION_ID_KEY,
};
use crate::domain::models::reservation::{NewReservationParams, Reservation, SOURCE_GOOGLE_CALENDAR};
use crate::domain::models::salon::SalonProfile;
use crate::domain::ports::{CalendarService, ReservationRepository};
use crate::domain::services::format::format_price;
use crate::error::AppError;

const MATCH_WINDOW_SECONDS: i64 = 30 * 60;
const STALE_AFTER_SECONDS: i64 = 60;
const IMPORT_WINDOW_DAYS: i64 = 90;
const REMINDER_MINUTES: [u32; 2] = [60, 15];

/// `【Salone Ponte】Tanaka - Cut`
pub fn event_title(reservation: &Reservation, salon: &SalonProfile) -> String {
    format!("{}{} - {}", salon.title_prefix(), reservation.customer_name, reservation.menu_name)
}

pub fn build_draft(reservation: &Reservation, salon: &SalonProfile) -> CalendarEventDraft {
    let description = [
        format!("顧客: {}", reservation.customer_name),
        format!("メニュー: {}", reservation.menu_name),
        format!("スタッフ: {}", reservation.staff_name),
        format!("料金: {}", format_price(reservation.menu_price)),
        format!("電話: {}", reservation.phone),
        format!("予約ID: {}", reservation.id),
    ]
    .join("\n");

    let private_properties = HashMap::from([
        (MARKER_KEY.to_string(), "true".to_string()),
        (RESERVATION_ID_KEY.to_string(), reservation.id.clone()),
        (CUSTOMER_ID_KEY.to_string(), reservation.customer_id.clone().unwrap_or_default()),
    ]);

    CalendarEventDraft {
        summary: event_title(reservation, salon),
        description,
        start: reservation.datetime,
        end: reservation.end_time(),
        time_zone: salon.timezone.name().to_string(),
        reminder_minutes: REMINDER_MINUTES.to_vec(),
        private_properties,
    }
}

/// Marker id is authoritative; otherwise start less than 30 minutes apart and the name in the title.
/// The fallback can pair the wrong booking when names collide.
pub fn matches(event: &CalendarEvent, reservation: &Reservation) -> bool {
    if let Some(id) = event.reservation_id() {
        return id == reservation.id;
    }
    if reservation.google_event_id.as_deref() == Some(event.id.as_str()) {
        return true;
    }
    let Some(start) = event.start else { return false };
    let name = reservation.customer_name.trim();
    (start - reservation.datetime).num_seconds().abs() < MATCH_WINDOW_SECONDS
        && !name.is_empty()
        && event.summary.contains(name)
}

pub fn needs_update(event: &CalendarEvent, reservation: &Reservation, salon: &SalonProfile) -> bool {
    let drifted = match event.start {
        Some(start) => (start - reservation.datetime).num_seconds().abs() > STALE_AFTER_SECONDS,
        None => true,
    };
    drifted || event.summary != event_title(reservation, salon)
}

/// Splits `【salon】{name} - {menu}` back into name and menu.
pub fn parse_import_title(summary: &str, salon: &SalonProfile) -> Option<(String, String)> {
    let rest = summary.strip_prefix(&salon.title_prefix())?;
    let (name, menu) = rest.split_once(" - ")?;
    let (name, menu) = (name.trim(), menu.trim());
    if name.is_empty() || menu.is_empty() {
        return None;
    }
    Some((name.to_string(), menu.to_string()))
}

enum ImportOutcome {
    Imported,
    Skipped,
}

/// Mirrors reservations into the external calendar and reconciles the two sides.
#[derive(Clone)]
pub struct CalendarSync {
    calendar: Arc<dyn CalendarService>,
    reservations: Arc<dyn ReservationRepository>,
    salon: SalonProfile,
}

impl CalendarSync {
    pub fn new(calendar: Arc<dyn CalendarService>, reservations: Arc<dyn ReservationRepository>, salon: SalonProfile) -> Self {
        Self { calendar, reservations, salon }
    }

    /// Returns the new event id; `None` when there was nothing to create.
    pub async fn create_for(&self, reservation: &Reservation) -> Result<Option<String>, AppError> {
        if reservation.is_cancelled() || reservation.google_event_id.is_some() {
            return Ok(None);
        }
        let event_id = self.calendar.insert_event(&build_draft(reservation, &self.salon)).await?;
        self.reservations.set_calendar_sync(&reservation.id, Some(&event_id), Utc::now()).await?;
        info!("Created calendar event {} for reservation {}", event_id, reservation.id);
        Ok(Some(event_id))
    }

    /// The stored event is gone from the calendar, so the link is dropped before inserting again.
    async fn recreate_for(&self, reservation: &Reservation, now: DateTime<Utc>) -> Result<Option<String>, AppError> {
        let Some(stale) = reservation.google_event_id.as_deref() else {
            return self.create_for(reservation).await;
        };
        self.reservations.set_calendar_sync(&reservation.id, None, now).await?;
        warn!("Calendar event {} for reservation {} no longer exists", stale, reservation.id);
        let unlinked = Reservation { google_event_id: None, ..reservation.clone() };
        self.create_for(&unlinked).await
    }

    /// Only reservations that already have an event are updated.
    pub async fn update_for(&self, reservation: &Reservation) -> Result<bool, AppError> {
        let Some(event_id) = reservation.google_event_id.as_deref() else { return Ok(false) };
        if reservation.is_cancelled() {
            return Ok(false);
        }
        self.calendar.update_event(event_id, &build_draft(reservation, &self.salon)).await?;
        self.reservations.set_calendar_sync(&reservation.id, Some(event_id), Utc::now()).await?;
        Ok(true)
    }

    pub async fn delete(&self, event_id: &str) -> Result<(), AppError> {
        self.calendar.delete_event(event_id).await
    }

    fn sync_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = now.checked_sub_months(Months::new(1)).unwrap_or(now);
        let end = now.checked_add_months(Months::new(3)).unwrap_or(now);
        (start, end)
    }

    pub async fn push_all(&self, now: DateTime<Utc>) -> Result<SyncReport, AppError> {
        let (start, end) = Self::sync_window(now);
        let reservations = self.reservations.list_between(start, end).await?;
        let mut report = SyncReport::default();

        for reservation in reservations.iter().filter(|r| !r.is_cancelled()) {
            let updating = reservation.google_event_id.is_some();
            let result = if updating {
                self.update_for(reservation).await.map(drop)
            } else {
                self.create_for(reservation).await.map(drop)
            };
            match result {
                Ok(()) if updating => report.updated += 1,
                Ok(()) => report.created += 1,
                Err(e) => {
                    warn!("Calendar push failed for reservation {}: {:?}", reservation.id, e);
                    report.errors += 1;
                }
            }
        }

        info!("Calendar push finished: {:?}", report);
        Ok(report)
    }

    async fn import_event(&self, event: &CalendarEvent, now: DateTime<Utc>) -> Result<ImportOutcome, AppError> {
        if !event.is_salon_event() {
            return Ok(ImportOutcome::Skipped);
        }
        let (Some(start), Some((name, menu))) = (event.start, parse_import_title(&event.summary, &self.salon)) else {
            return Ok(ImportOutcome::Skipped);
        };
        if self.reservations.find_by_google_event_id(&event.id).await?.is_some() {
            return Ok(ImportOutcome::Skipped);
        }
        if let Some(id) = event.reservation_id()
            && self.reservations.find_by_id(id).await?.is_some()
        {
            return Ok(ImportOutcome::Skipped);
        }

        let customer_id = event.private_properties.get(CUSTOMER_ID_KEY).filter(|c| !c.is_empty()).cloned();
        let duration = event.end.map(|end| (end - start).num_minutes()).filter(|d| *d > 0);
        let mut reservation = Reservation::new(NewReservationParams {
            customer_id: customer_id.clone(),
            line_user_id: customer_id,
            customer_name: name,
            phone: String::new(),
            menu_id: None,
            menu_name: menu,
            menu_price: 0,
            menu_duration: duration,
            staff_id: None,
            staff_name: String::new(),
            datetime: start,
            note: String::new(),
            source: SOURCE_GOOGLE_CALENDAR,
        });
        reservation.id = event.reservation_id().map(str::to_string).unwrap_or_else(|| format!("google_{}", event.id));
        reservation.google_event_id = Some(event.id.clone());
        reservation.google_synced_at = Some(now);

        self.reservations.create_with_jobs(&reservation, Vec::new()).await?;
        info!("Imported calendar event {} as reservation {}", event.id, reservation.id);
        Ok(ImportOutcome::Imported)
    }

    pub async fn import(&self, now: DateTime<Utc>) -> Result<ImportReport, AppError> {
        let events = self.calendar.list_events(now, now + Duration::days(IMPORT_WINDOW_DAYS)).await?;
        let mut report = ImportReport { total: events.len() as u32, ..Default::default() };

        for event in &events {
            match self.import_event(event, now).await {
                Ok(ImportOutcome::Imported) => report.imported += 1,
                Ok(ImportOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    warn!("Failed to import calendar event {}: {:?}", event.id, e);
                    report.errors += 1;
                }
            }
        }

        info!("Calendar import finished: {:?}", report);
        Ok(report)
    }

    pub async fn bidirectional(&self, now: DateTime<Utc>) -> Result<BidirectionalReport, AppError> {
        let (start, end) = Self::sync_window(now);
        let events = self.calendar.list_events(start, end).await?;
        let reservations = self.reservations.list_between(start, end).await?;
        let mut report = BidirectionalReport::default();
        let mut claimed: HashSet<&str> = HashSet::new();

        for reservation in reservations.iter().filter(|r| !r.is_cancelled()) {
            let found = events
                .iter()
                .find(|e| !claimed.contains(e.id.as_str()) && matches(e, reservation));

            let Some(event) = found else {
                match self.recreate_for(reservation, now).await {
                    Ok(Some(_)) => report.created += 1,
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Calendar create failed for reservation {}: {:?}", reservation.id, e);
                        report.errors += 1;
                    }
                }
                continue;
            };
            claimed.insert(event.id.as_str());

            let mut linked = reservation.clone();
            if reservation.google_event_id.as_deref() != Some(event.id.as_str()) {
                if let Err(e) = self.reservations.set_calendar_sync(&reservation.id, Some(&event.id), now).await {
                    warn!("Failed to link reservation {} to event {}: {:?}", reservation.id, event.id, e);
                    report.errors += 1;
                    continue;
                }
                linked.google_event_id = Some(event.id.clone());
                report.linked += 1;
            }

            if !needs_update(event, reservation, &self.salon) {
                report.unchanged += 1;
                continue;
            }
            match self.update_for(&linked).await {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    warn!("Calendar update failed for reservation {}: {:?}", reservation.id, e);
                    report.errors += 1;
                }
            }
        }

        for event in events.iter().filter(|e| !claimed.contains(e.id.as_str())) {
            match self.import_event(event, now).await {
                Ok(ImportOutcome::Imported) => report.imported += 1,
                Ok(ImportOutcome::Skipped) => {}
                Err(e) => {
                    warn!("Failed to import calendar event {}: {:?}", event.id, e);
                    report.errors += 1;
                }
            }
        }

        info!("Bidirectional calendar sync finished: {:?}", report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::reservation::SOURCE_BOOKING;
    use chrono::TimeZone;

    fn salon() -> SalonProfile {
        SalonProfile { name: "Salone Ponte".into(), timezone: chrono_tz::Asia::Tokyo, app_url: "http://localhost:3000".into() }
    }

    fn reservation(duration: Option<i64>) -> Reservation {
        Reservation::new(NewReservationParams {
            customer_id: Some("U1".into()),
            line_user_id: Some("U1".into()),
            customer_name: "Tanaka".into(),
            phone: "090-0000-0000".into(),
            menu_id: None,
            menu_name: "Cut".into(),
            menu_price: 4000,
            menu_duration: duration,
            staff_id: None,
            staff_name: "Yamada".into(),
            datetime: Utc.with_ymd_and_hms(2025, 1, 10, 5, 0, 0).unwrap(),
            note: String::new(),
            source: SOURCE_BOOKING,
        })
    }

    fn event(summary: &str, start: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent { id: "evt1".into(), summary: summary.into(), start: Some(start), ..Default::default() }
    }

    #[test]
    fn draft_defaults_to_one_hour() {
        let r = reservation(None);
        let draft = build_draft(&r, &salon());
        assert_eq!(draft.summary, "【Salone Ponte】Tanaka - Cut");
        assert_eq!(draft.end - draft.start, Duration::minutes(60));
        assert_eq!(draft.time_zone, "Asia/Tokyo");
        assert_eq!(draft.reminder_minutes, vec![60, 15]);
        assert_eq!(draft.private_properties[MARKER_KEY], "true");
        assert_eq!(draft.private_properties[RESERVATION_ID_KEY], r.id);
        assert!(draft.description.contains("料金: ¥4,000"));
    }

    #[test]
    fn marker_id_wins_over_heuristic() {
        let r = reservation(Some(60));
        let mut e = event("【Salone Ponte】Tanaka - Cut", r.datetime);
        e.private_properties.insert(RESERVATION_ID_KEY.into(), "someone-else".into());
        assert!(!matches(&e, &r));

        e.private_properties.insert(RESERVATION_ID_KEY.into(), r.id.clone());
        assert!(matches(&e, &r));
    }

    #[test]
    fn heuristic_needs_name_and_nearby_start() {
        let r = reservation(Some(60));
        assert!(matches(&event("Tanaka perm", r.datetime + Duration::seconds(29 * 60 + 59)), &r));
        assert!(matches(&event("Tanaka perm", r.datetime - Duration::minutes(29)), &r));
        assert!(!matches(&event("Tanaka perm", r.datetime + Duration::minutes(30)), &r));
        assert!(!matches(&event("Tanaka perm", r.datetime + Duration::seconds(30 * 60 + 59)), &r));
        assert!(!matches(&event("Suzuki perm", r.datetime), &r));
    }

    #[test]
    fn stale_when_moved_or_retitled() {
        let r = reservation(Some(60));
        let title = event_title(&r, &salon());
        assert!(!needs_update(&event(&title, r.datetime + Duration::seconds(60)), &r, &salon()));
        assert!(needs_update(&event(&title, r.datetime + Duration::seconds(61)), &r, &salon()));
        assert!(needs_update(&event("Tanaka - Cut", r.datetime), &r, &salon()));
    }

    #[test]
    fn parses_import_titles() {
        let s = salon();
        assert_eq!(
            parse_import_title("【Salone Ponte】Tanaka - Cut + Color", &s),
            Some(("Tanaka".into(), "Cut + Color".into()))
        );
        assert_eq!(parse_import_title("Tanaka - Cut", &s), None);
        assert_eq!(parse_import_title("【Salone Ponte】Tanaka", &s), None);
        assert_eq!(parse_import_title("【Salone Ponte】 - Cut", &s), None);
    }
}
