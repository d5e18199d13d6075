use std::sync::Arc;
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use tera::Tera;
use tracing::{info, warn};
use crate::domain::models::message::LineMessage;
use crate::domain::models::message_log::{MessageLog, STATUS_FAILED};
use crate::domain::models::reservation::Reservation;
use crate::domain::models::salon::SalonProfile;
use crate::domain::ports::{MessageLogRepository, MessagingService};
use crate::domain::services::flex::{self, SeasonalMenu};
use crate::domain::services::format::ReservationView;
use crate::domain::services::templates::{self, render_text};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Confirmation,
    StaffNewBooking,
    Reminder,
    HourReminder,
    Cancellation,
    Birthday,
    Retention,
    Seasonal,
    Manual,
    Broadcast,
    Template,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "confirmation",
            NotificationKind::StaffNewBooking => "staff_new_booking",
            NotificationKind::Reminder => "reminder",
            NotificationKind::HourReminder => "reminder_1h",
            NotificationKind::Cancellation => "cancellation",
            NotificationKind::Birthday => "birthday",
            NotificationKind::Retention => "retention",
            NotificationKind::Seasonal => "seasonal",
            NotificationKind::Manual => "manual",
            NotificationKind::Broadcast => "broadcast",
            NotificationKind::Template => "template",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: LineMessage,
    /// Plain-text copy pushed when the primary message is rejected.
    pub fallback: Option<LineMessage>,
}

impl Notification {
    pub fn plain(kind: NotificationKind, message: LineMessage) -> Self {
        Self { kind, message, fallback: None }
    }
}

/// Log references attached to every delivery attempt.
#[derive(Debug, Clone, Default)]
pub struct DeliveryRefs {
    pub customer_id: Option<String>,
    pub reservation_id: Option<String>,
}

impl DeliveryRefs {
    pub fn for_reservation(reservation: &Reservation) -> Self {
        Self {
            customer_id: reservation.customer_id.clone(),
            reservation_id: Some(reservation.id.clone()),
        }
    }

    pub fn for_customer(customer_id: &str) -> Self {
        Self { customer_id: Some(customer_id.to_string()), reservation_id: None }
    }
}

fn with_fallback(
    tera: &Tera,
    kind: NotificationKind,
    message: LineMessage,
    template: &str,
    data: &impl serde::Serialize,
) -> Result<Notification, AppError> {
    let text = render_text(tera, template, data)?;
    Ok(Notification { kind, message, fallback: Some(LineMessage::text(text)) })
}

pub fn confirmation(tera: &Tera, reservation: &Reservation, salon: &SalonProfile) -> Result<Notification, AppError> {
    let view = ReservationView::new(reservation, salon);
    with_fallback(tera, NotificationKind::Confirmation, flex::confirmation(&view), templates::TEXT_CONFIRMATION, &view)
}

pub fn staff_new_booking(tera: &Tera, reservation: &Reservation, salon: &SalonProfile) -> Result<Notification, AppError> {
    let view = ReservationView::new(reservation, salon);
    with_fallback(tera, NotificationKind::StaffNewBooking, flex::staff_new_booking(&view), templates::TEXT_STAFF_NEW_BOOKING, &view)
}

pub fn day_before_reminder(tera: &Tera, reservation: &Reservation, salon: &SalonProfile) -> Result<Notification, AppError> {
    let view = ReservationView::new(reservation, salon);
    with_fallback(tera, NotificationKind::Reminder, flex::day_before_reminder(&view), templates::TEXT_REMINDER, &view)
}

pub fn hour_before_reminder(tera: &Tera, reservation: &Reservation, salon: &SalonProfile) -> Result<Notification, AppError> {
    let view = ReservationView::new(reservation, salon);
    with_fallback(tera, NotificationKind::HourReminder, flex::hour_before_reminder(&view), templates::TEXT_REMINDER_1H, &view)
}

pub fn cancellation(tera: &Tera, reservation: &Reservation, salon: &SalonProfile) -> Result<Notification, AppError> {
    let view = ReservationView::new(reservation, salon);
    with_fallback(tera, NotificationKind::Cancellation, flex::cancellation(&view), templates::TEXT_CANCELLATION, &view)
}

pub fn birthday(tera: &Tera, name: &str, salon: &SalonProfile) -> Result<Notification, AppError> {
    let data = json!({ "name": name, "salon": salon.name, "booking_url": salon.booking_url() });
    with_fallback(tera, NotificationKind::Birthday, flex::birthday(name, salon), templates::TEXT_BIRTHDAY, &data)
}

pub fn retention(tera: &Tera, name: &str, salon: &SalonProfile) -> Result<Notification, AppError> {
    let data = json!({ "name": name, "salon": salon.name, "booking_url": salon.booking_url() });
    with_fallback(tera, NotificationKind::Retention, flex::retention(name, salon), templates::TEXT_RETENTION, &data)
}

pub fn seasonal(tera: &Tera, name: &str, season: &SeasonalMenu, salon: &SalonProfile) -> Result<Notification, AppError> {
    let data = json!({
        "name": name,
        "salon": salon.name,
        "booking_url": salon.booking_url(),
        "season": season.season,
        "menu": season.menu,
        "description": season.description,
    });
    with_fallback(tera, NotificationKind::Seasonal, flex::seasonal(name, season, salon), templates::TEXT_SEASONAL, &data)
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct BroadcastReport {
    pub total: u32,
    pub success: u32,
    pub failed: u32,
}

/// Pushes notifications and records every attempt in the message log.
#[derive(Clone)]
pub struct NotificationDispatcher {
    messaging: Arc<dyn MessagingService>,
    logs: Arc<dyn MessageLogRepository>,
}

impl NotificationDispatcher {
    pub fn new(messaging: Arc<dyn MessagingService>, logs: Arc<dyn MessageLogRepository>) -> Self {
        Self { messaging, logs }
    }

    pub async fn deliver(&self, recipient: &str, notification: &Notification, refs: &DeliveryRefs) -> Result<(), AppError> {
        if recipient.trim().is_empty() {
            return Err(AppError::Validation("Recipient has no LINE user id".into()));
        }

        let primary = self.attempt(recipient, notification.kind, &notification.message, refs).await;
        let Err(primary_err) = primary else { return Ok(()) };

        match &notification.fallback {
            Some(fallback) => {
                warn!("{} push to {} failed, sending text fallback", notification.kind.as_str(), recipient);
                self.attempt(recipient, notification.kind, fallback, refs).await
            }
            None => Err(primary_err),
        }
    }

    /// Sends to every recipient regardless of individual failures. Blank ids count as failures.
    pub async fn broadcast(&self, recipients: &[String], notification: &Notification) -> BroadcastReport {
        let outcomes = join_all(recipients.iter().map(|recipient| async move {
            let refs = DeliveryRefs::for_customer(recipient);
            match self.deliver(recipient, notification, &refs).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Broadcast to '{}' failed: {}", recipient, e);
                    false
                }
            }
        }))
        .await;

        let success = outcomes.iter().filter(|ok| **ok).count() as u32;
        let total = recipients.len() as u32;
        info!("Broadcast {} finished: {}/{} delivered", notification.kind.as_str(), success, total);
        BroadcastReport { total, success, failed: total - success }
    }

    async fn attempt(&self, recipient: &str, kind: NotificationKind, message: &LineMessage, refs: &DeliveryRefs) -> Result<(), AppError> {
        let result = self.messaging.push(recipient, std::slice::from_ref(message)).await;

        let body = serde_json::to_string(message).unwrap_or_default();
        let mut log = MessageLog::new(recipient, kind.as_str(), message.channel(), body);
        log.customer_id = refs.customer_id.clone();
        log.reservation_id = refs.reservation_id.clone();
        if let Err(e) = &result {
            log.status = STATUS_FAILED.to_string();
            log.error_message = Some(e.to_string());
        } else {
            info!("Delivered {} ({}) to {}", kind.as_str(), message.channel(), recipient);
        }

        // Log write failures are not delivery failures.
        if let Err(e) = self.logs.create(&log).await {
            warn!("Failed to write message log: {:?}", e);
        }
        result
    }
}
