use crate::domain::models::{
    calendar::{CalendarEvent, CalendarEventDraft},
    customer::{Customer, CustomerUpdate, CustomerVisit, HistoryEntry},
    job::{Job, JobKind},
    menu::Menu,
    message::{LineMessage, LineProfile},
    message_log::MessageLog,
    reservation::{Reservation, ReservationFilter},
    staff::Staff,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Inserts the reservation together with its fan-out jobs in one transaction.
    async fn create_with_jobs(&self, reservation: &Reservation, jobs: Vec<Job>) -> Result<Reservation, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError>;
    async fn find_by_google_event_id(&self, event_id: &str) -> Result<Option<Reservation>, AppError>;
    async fn list_recent(&self, filter: &ReservationFilter, limit: i64) -> Result<Vec<Reservation>, AppError>;
    /// Reservations starting in `[start, end)`, cancelled ones included.
    async fn list_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Reservation>, AppError>;
    async fn list_active_for_staff(&self, staff_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Reservation>, AppError>;
    async fn history_for_customer(&self, customer_id: &str) -> Result<Vec<HistoryEntry>, AppError>;
    /// Writes the edited row, cancels pending jobs of `cancel_kinds`, then queues `jobs`.
    async fn update_with_jobs(&self, reservation: &Reservation, cancel_kinds: &[JobKind], jobs: Vec<Job>) -> Result<Reservation, AppError>;
    async fn set_calendar_sync(&self, id: &str, google_event_id: Option<&str>, synced_at: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError>;
    async fn list(&self) -> Result<Vec<Customer>, AppError>;
    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Customer>, AppError>;
    async fn list_by_birthday(&self, month_day: &str) -> Result<Vec<Customer>, AppError>;
    /// Customers whose latest reservation starts before `cutoff`.
    async fn list_inactive_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Customer>, AppError>;
    async fn record_visit(&self, visit: &CustomerVisit) -> Result<Customer, AppError>;
    async fn update(&self, id: &str, update: &CustomerUpdate) -> Result<Customer, AppError>;
}

#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn create(&self, menu: &Menu) -> Result<Menu, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Menu>, AppError>;
    async fn list_active(&self) -> Result<Vec<Menu>, AppError>;
    async fn update(&self, menu: &Menu) -> Result<Menu, AppError>;
}

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn create(&self, staff: &Staff) -> Result<Staff, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Staff>, AppError>;
    async fn list_active(&self) -> Result<Vec<Staff>, AppError>;
    async fn update(&self, staff: &Staff) -> Result<Staff, AppError>;
}

#[async_trait]
pub trait MessageLogRepository: Send + Sync {
    async fn create(&self, log: &MessageLog) -> Result<(), AppError>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<MessageLog>, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    /// Claims due jobs by flipping them to PROCESSING.
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait MessagingService: Send + Sync {
    async fn push(&self, to: &str, messages: &[LineMessage]) -> Result<(), AppError>;
    async fn get_profile(&self, user_id: &str) -> Result<LineProfile, AppError>;
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Returns the id of the created event.
    async fn insert_event(&self, draft: &CalendarEventDraft) -> Result<String, AppError>;
    async fn update_event(&self, event_id: &str, draft: &CalendarEventDraft) -> Result<(), AppError>;
    async fn delete_event(&self, event_id: &str) -> Result<(), AppError>;
    async fn list_events(&self, time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Result<Vec<CalendarEvent>, AppError>;
}
