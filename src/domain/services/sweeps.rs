use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use serde::Serialize;
use tera::Tera;
use tracing::{info, warn};
use crate::domain::models::reservation::{Reservation, ReservationStatus};
use crate::domain::models::salon::SalonProfile;
use crate::domain::ports::{CustomerRepository, ReservationRepository};
use crate::domain::services::clock::day_bounds;
use crate::domain::services::flex::SeasonalMenu;
use crate::domain::services::notifications::{self, DeliveryRefs, Notification, NotificationDispatcher};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepKind {
    Reminder,
    Birthday,
    Retention,
    Seasonal,
}

impl SweepKind {
    pub const ALL: [SweepKind; 4] = [SweepKind::Reminder, SweepKind::Birthday, SweepKind::Retention, SweepKind::Seasonal];

    pub fn as_str(&self) -> &'static str {
        match self {
            SweepKind::Reminder => "reminder",
            SweepKind::Birthday => "birthday",
            SweepKind::Retention => "retention",
            SweepKind::Seasonal => "seasonal",
        }
    }

    /// Five-field cron, evaluated in the salon's zone. Weekdays are spelled out
    /// because the `cron` crate numbers them from Sunday = 1.
    pub fn cron_expression(&self) -> &'static str {
        match self {
            SweepKind::Reminder => "0 18 * * *",
            SweepKind::Birthday => "0 9 * * *",
            SweepKind::Retention => "0 10 * * Mon",
            SweepKind::Seasonal => "0 11 1 * *",
        }
    }
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SweepKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SweepKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown sweep {}", s)))
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SweepReport {
    pub kind: SweepKind,
    pub targeted: u32,
    pub sent: u32,
    pub failed: u32,
}

pub fn seasonal_menu(month: u32) -> Option<SeasonalMenu> {
    let (season, menu, description) = match month {
        3 => ("春", "さくらカラー", "春らしいピンクカラーで新しい季節を迎えませんか？"),
        6 => ("夏", "クールカット", "暑い夏を涼しく過ごせるスッキリスタイル"),
        9 => ("秋", "オータムカラー", "深みのあるカラーで大人っぽく"),
        12 => ("冬", "ウィンターパーマ", "乾燥に負けない潤いパーマ"),
        _ => return None,
    };
    Some(SeasonalMenu { season, menu, description })
}

/// `[tomorrow 00:00, day after 00:00)` in the salon's zone.
pub fn reminder_window(today: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    day_bounds(today + chrono::Duration::days(1), 1, tz)
}

/// Customers whose last visit is before this instant are due a retention message.
pub fn retention_cutoff(today: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let date = today.checked_sub_months(Months::new(2)).unwrap_or(today);
    day_bounds(date, 0, tz).0
}

pub fn birthday_key(today: NaiveDate) -> String {
    format!("{:02}-{:02}", today.month(), today.day())
}

pub fn due_reminders(reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.into_iter().filter(|r| r.status == ReservationStatus::Confirmed).collect()
}

struct Target {
    recipient: Option<String>,
    notification: Notification,
    refs: DeliveryRefs,
}

#[derive(Clone)]
pub struct SweepRunner {
    reservations: Arc<dyn ReservationRepository>,
    customers: Arc<dyn CustomerRepository>,
    dispatcher: NotificationDispatcher,
    templates: Arc<Tera>,
    salon: SalonProfile,
}

impl SweepRunner {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        customers: Arc<dyn CustomerRepository>,
        dispatcher: NotificationDispatcher,
        templates: Arc<Tera>,
        salon: SalonProfile,
    ) -> Self {
        Self { reservations, customers, dispatcher, templates, salon }
    }

    pub async fn run(&self, kind: SweepKind, today: NaiveDate) -> Result<SweepReport, AppError> {
        let targets = self.targets(kind, today).await?;
        let targeted = targets.len() as u32;

        let outcomes = join_all(targets.iter().map(|t| async move {
            let Some(recipient) = t.recipient.as_deref() else {
                warn!("Skipping {} for {:?}: no LINE user id", kind, t.refs.customer_id);
                return false;
            };
            match self.dispatcher.deliver(recipient, &t.notification, &t.refs).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("{} delivery to {} failed: {:?}", kind, recipient, e);
                    false
                }
            }
        }))
        .await;

        let sent = outcomes.iter().filter(|ok| **ok).count() as u32;
        let report = SweepReport { kind, targeted, sent, failed: targeted - sent };
        info!("Sweep {} finished: {} sent, {} failed", kind, report.sent, report.failed);
        Ok(report)
    }

    async fn targets(&self, kind: SweepKind, today: NaiveDate) -> Result<Vec<Target>, AppError> {
        let tera = self.templates.as_ref();
        let salon = &self.salon;

        let targets = match kind {
            SweepKind::Reminder => {
                let (start, end) = reminder_window(today, salon.timezone);
                due_reminders(self.reservations.list_between(start, end).await?)
                    .iter()
                    .map(|r| -> Result<Target, AppError> {
                        Ok(Target {
                            recipient: r.recipient().map(str::to_string),
                            notification: notifications::day_before_reminder(tera, r, salon)?,
                            refs: DeliveryRefs::for_reservation(r),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            SweepKind::Birthday | SweepKind::Retention | SweepKind::Seasonal => {
                let season = match kind {
                    SweepKind::Seasonal => match seasonal_menu(today.month()) {
                        Some(season) => Some(season),
                        None => {
                            info!("No seasonal menu for month {}", today.month());
                            return Ok(Vec::new());
                        }
                    },
                    _ => None,
                };
                let customers = match kind {
                    SweepKind::Birthday => self.customers.list_by_birthday(&birthday_key(today)).await?,
                    SweepKind::Retention => self.customers.list_inactive_since(retention_cutoff(today, salon.timezone)).await?,
                    _ => self.customers.list().await?,
                };
                customers
                    .iter()
                    .map(|c| -> Result<Target, AppError> {
                        let notification = match (&season, kind) {
                            (Some(season), _) => notifications::seasonal(tera, &c.name, season, salon)?,
                            (None, SweepKind::Birthday) => notifications::birthday(tera, &c.name, salon)?,
                            (None, _) => notifications::retention(tera, &c.name, salon)?,
                        };
                        Ok(Target {
                            recipient: c.recipient().map(str::to_string),
                            notification,
                            refs: DeliveryRefs::for_customer(&c.id),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(targets)
    }
}
