use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use crate::domain::models::customer::Customer;
use crate::domain::models::job::{Job, JobKind};
use crate::domain::models::menu::Menu;
use crate::domain::models::reservation::{Reservation, ReservationStatus};
use crate::domain::models::staff::Staff;
use crate::domain::services::booking_flow::{advance, BookingAction, BookingSelection, BookingSession, WizardError};
use crate::error::AppError;

const ALL_PENDING_KINDS: [JobKind; 5] = [
    JobKind::NotifyConfirmation,
    JobKind::NotifyStaff,
    JobKind::Reminder1h,
    JobKind::CalendarCreate,
    JobKind::CalendarUpdate,
];

/// Drives a fresh wizard session with whatever the request supplied.
pub fn replay_wizard(
    menu: Option<Menu>,
    staff: Option<Staff>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
) -> Result<BookingSelection, WizardError> {
    let mut actions = Vec::new();
    actions.extend(menu.map(BookingAction::SelectMenu));
    actions.push(BookingAction::Next);
    actions.extend(staff.map(BookingAction::SelectStaff));
    actions.push(BookingAction::Next);
    actions.extend(date.map(BookingAction::SelectDate));
    actions.extend(time.map(BookingAction::SelectTime));
    actions.push(BookingAction::Next);
    actions.push(BookingAction::Submit);

    let session = actions.into_iter().try_fold(BookingSession::new(), advance)?;
    session.selection().ok_or(WizardError::MissingSelection("booking"))
}

/// Name and phone for the booking; new customers must supply both.
pub fn resolve_contact(
    existing: Option<&Customer>,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<(String, String), AppError> {
    let clean = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
    let (name, phone) = (clean(name), clean(phone));

    match existing {
        Some(customer) => Ok((
            name.unwrap_or_else(|| customer.name.clone()),
            phone.unwrap_or_else(|| customer.phone.clone()),
        )),
        None => {
            let name = name.ok_or(AppError::Validation("Name is required for new customers".into()))?;
            let phone = phone.ok_or(AppError::Validation("Phone is required for new customers".into()))?;
            Ok((name, phone))
        }
    }
}

fn hour_reminder(reservation: &Reservation, now: DateTime<Utc>) -> Option<Job> {
    let at = reservation.datetime - Duration::hours(1);
    (at > now).then(|| Job::new(JobKind::Reminder1h, reservation.id.clone(), at))
}

/// Jobs written in the same transaction as a new reservation.
pub fn creation_jobs(reservation: &Reservation, now: DateTime<Utc>) -> Vec<Job> {
    let mut jobs = vec![
        Job::new(JobKind::NotifyConfirmation, reservation.id.clone(), now),
        Job::new(JobKind::NotifyStaff, reservation.id.clone(), now),
        Job::new(JobKind::CalendarCreate, reservation.id.clone(), now),
    ];
    jobs.extend(hour_reminder(reservation, now));
    jobs
}

#[derive(Debug, Clone, Default)]
pub struct ReservationEdit {
    pub status: Option<ReservationStatus>,
    pub datetime: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

#[derive(Debug)]
pub struct EditPlan {
    pub reservation: Reservation,
    pub changed: bool,
    pub cancel_kinds: Vec<JobKind>,
    pub jobs: Vec<Job>,
}

impl EditPlan {
    /// True when the stored row would be written back unchanged.
    pub fn is_noop(&self) -> bool {
        !self.changed
    }
}

/// Applies an admin edit and works out which jobs to cancel and queue.
pub fn plan_edit(current: &Reservation, edit: ReservationEdit, now: DateTime<Utc>) -> Result<EditPlan, AppError> {
    let mut next = current.clone();
    if let Some(status) = edit.status {
        next.status = status;
    }
    if let Some(datetime) = edit.datetime {
        next.datetime = datetime;
    }
    if let Some(note) = edit.note {
        next.note = note;
    }

    let status_changed = next.status != current.status;
    let time_changed = next.datetime != current.datetime;
    let note_changed = next.note != current.note;

    if current.is_cancelled() && (status_changed || time_changed) {
        return Err(AppError::Validation("Cancelled reservations cannot be rescheduled or reopened".into()));
    }

    let changed = status_changed || time_changed || note_changed;
    let mut plan = EditPlan { reservation: next, changed, cancel_kinds: Vec::new(), jobs: Vec::new() };
    if !changed {
        return Ok(plan);
    }
    plan.reservation.updated_at = now;

    if plan.reservation.is_cancelled() {
        if status_changed {
            plan.cancel_kinds.extend(ALL_PENDING_KINDS);
            plan.jobs.push(Job::new(JobKind::NotifyCancellation, current.id.clone(), now));
            if let Some(event_id) = current.google_event_id.clone() {
                plan.jobs.push(Job::calendar_delete(&current.id, event_id));
            }
            plan.reservation.google_event_id = None;
            plan.reservation.google_synced_at = Some(now);
        }
        return Ok(plan);
    }

    if time_changed {
        plan.cancel_kinds.push(JobKind::Reminder1h);
        plan.jobs.extend(hour_reminder(&plan.reservation, now));
    }
    plan.jobs.push(Job::new(JobKind::CalendarUpdate, current.id.clone(), now));
    Ok(plan)
}
