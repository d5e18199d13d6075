use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::domain::models::job::{Job, JobKind, STATUS_COMPLETED, STATUS_FAILED};
use crate::domain::models::reservation::{Reservation, ReservationStatus};
use crate::domain::services::notifications::{self, DeliveryRefs, Notification};
use crate::error::AppError;
use crate::state::AppState;

const BATCH_SIZE: i32 = 10;
const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background job worker...");

    loop {
        run_pending_jobs(&state).await;
        sleep(POLL_INTERVAL).await;
    }
}

/// Claims one batch of due jobs and runs it. Returns how many jobs were claimed.
pub async fn run_pending_jobs(state: &AppState) -> usize {
    let jobs = match state.job_repo.find_pending(BATCH_SIZE).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Failed to fetch pending jobs: {:?}", e);
            return 0;
        }
    };
    let claimed = jobs.len();

    for job in jobs {
        let span = info_span!(
            "background_job",
            job_id = %job.id,
            job_type = %job.job_type,
            reservation_id = %job.payload.reservation_id
        );

        async {
            info!("Processing job: {}", job.job_type);
            match process_job(state, &job).await {
                Ok(_) => {
                    info!("Job completed successfully");
                    if let Err(e) = state.job_repo.update_status(&job.id, STATUS_COMPLETED, None).await {
                        error!("Failed to mark job as completed: {:?}", e);
                    }
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    error!("Job failed with error: {}", err_msg);
                    if let Err(up_err) = state.job_repo.update_status(&job.id, STATUS_FAILED, Some(err_msg)).await {
                        error!("Failed to mark job as failed: {:?}", up_err);
                    }
                }
            }
        }
        .instrument(span)
        .await;
    }

    claimed
}

async fn notify(state: &AppState, recipient: Option<&str>, notification: Notification, refs: DeliveryRefs) -> Result<(), AppError> {
    let Some(recipient) = recipient else {
        info!("No LINE recipient for {}, skipping", notification.kind.as_str());
        return Ok(());
    };
    state.dispatcher().deliver(recipient, &notification, &refs).await
}

async fn process_job(state: &AppState, job: &Job) -> Result<(), AppError> {
    let kind = job.kind().map_err(AppError::InternalWithMsg)?;
    let reservation_id = &job.payload.reservation_id;

    if kind == JobKind::CalendarDelete {
        let Some(event_id) = job.payload.google_event_id.as_deref() else {
            return Err(AppError::InternalWithMsg("CALENDAR_DELETE job without an event id".into()));
        };
        let Some(sync) = state.calendar_sync() else {
            info!("Calendar mirror disabled, skipping");
            return Ok(());
        };
        sync.delete(event_id).await?;
        info!("Deleted calendar event {}", event_id);
        return Ok(());
    }

    let reservation: Reservation = state.reservation_repo.find_by_id(reservation_id).await?
        .ok_or(AppError::NotFound(format!("Reservation {} not found", reservation_id)))?;

    if reservation.is_cancelled() && kind != JobKind::NotifyCancellation {
        info!("Reservation {} is cancelled, skipping {}", reservation.id, kind);
        return Ok(());
    }

    let tera = state.templates.as_ref();
    let salon = &state.salon;
    let refs = DeliveryRefs::for_reservation(&reservation);

    match kind {
        JobKind::NotifyConfirmation => {
            let notification = notifications::confirmation(tera, &reservation, salon)?;
            notify(state, reservation.recipient(), notification, refs).await
        }
        JobKind::NotifyCancellation => {
            let notification = notifications::cancellation(tera, &reservation, salon)?;
            notify(state, reservation.recipient(), notification, refs).await
        }
        JobKind::Reminder1h => {
            if reservation.status != ReservationStatus::Confirmed {
                info!("Reservation {} is {}, skipping hour reminder", reservation.id, reservation.status.as_str());
                return Ok(());
            }
            let notification = notifications::hour_before_reminder(tera, &reservation, salon)?;
            notify(state, reservation.recipient(), notification, refs).await
        }
        JobKind::NotifyStaff => {
            let Some(staff_id) = reservation.staff_id.as_deref() else {
                info!("Reservation {} has no staff, skipping", reservation.id);
                return Ok(());
            };
            let staff = state.staff_repo.find_by_id(staff_id).await?
                .ok_or(AppError::NotFound(format!("Staff {} not found", staff_id)))?;
            let notification = notifications::staff_new_booking(tera, &reservation, salon)?;
            notify(state, staff.recipient(), notification, refs).await
        }
        JobKind::CalendarCreate | JobKind::CalendarUpdate => {
            let Some(sync) = state.calendar_sync() else {
                info!("Calendar mirror disabled, skipping");
                return Ok(());
            };
            if kind == JobKind::CalendarCreate {
                sync.create_for(&reservation).await.map(drop)
            } else {
                sync.update_for(&reservation).await.map(drop)
            }
        }
        JobKind::CalendarDelete => Ok(()),
    }
}
