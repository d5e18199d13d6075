use std::sync::Arc;
use crate::domain::models::salon::SalonProfile;
use crate::domain::ports::{
    CalendarService, CustomerRepository, JobRepository, MenuRepository, MessageLogRepository,
    MessagingService, ReservationRepository, StaffRepository,
};
use crate::domain::services::calendar_sync::CalendarSync;
use crate::domain::services::notifications::NotificationDispatcher;
use crate::domain::services::sweeps::SweepRunner;
use crate::config::Config;
use crate::error::AppError;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub salon: SalonProfile,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub customer_repo: Arc<dyn CustomerRepository>,
    pub menu_repo: Arc<dyn MenuRepository>,
    pub staff_repo: Arc<dyn StaffRepository>,
    pub message_log_repo: Arc<dyn MessageLogRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub messaging: Arc<dyn MessagingService>,
    /// `None` when Google Calendar credentials are not configured.
    pub calendar: Option<Arc<dyn CalendarService>>,
    pub templates: Arc<Tera>,
}

impl AppState {
    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(self.messaging.clone(), self.message_log_repo.clone())
    }

    pub fn calendar_sync(&self) -> Option<CalendarSync> {
        self.calendar
            .as_ref()
            .map(|calendar| CalendarSync::new(calendar.clone(), self.reservation_repo.clone(), self.salon.clone()))
    }

    pub fn require_calendar_sync(&self) -> Result<CalendarSync, AppError> {
        self.calendar_sync()
            .ok_or_else(|| AppError::Validation("Google Calendar is not configured".into()))
    }

    pub fn sweeps(&self) -> SweepRunner {
        SweepRunner::new(
            self.reservation_repo.clone(),
            self.customer_repo.clone(),
            self.dispatcher(),
            self.templates.clone(),
            self.salon.clone(),
        )
    }
}
