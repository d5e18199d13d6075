use crate::domain::models::{
    customer::HistoryEntry,
    job::{Job, JobKind},
    reservation::{Reservation, ReservationFilter, ReservationStatus},
};
use crate::domain::ports::ReservationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteReservationRepo {
    pool: SqlitePool,
}

impl SqliteReservationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const INSERT_JOB: &str = "INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)";

#[async_trait]
impl ReservationRepository for SqliteReservationRepo {
    async fn create_with_jobs(&self, reservation: &Reservation, jobs: Vec<Job>) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (id, customer_id, line_user_id, customer_name, phone, menu_id, menu_name, menu_price, menu_duration, staff_id, staff_name, datetime, note, status, source, google_event_id, google_synced_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&reservation.id).bind(&reservation.customer_id).bind(&reservation.line_user_id)
            .bind(&reservation.customer_name).bind(&reservation.phone).bind(&reservation.menu_id)
            .bind(&reservation.menu_name).bind(reservation.menu_price).bind(reservation.menu_duration)
            .bind(&reservation.staff_id).bind(&reservation.staff_name).bind(reservation.datetime)
            .bind(&reservation.note).bind(reservation.status).bind(&reservation.source)
            .bind(&reservation.google_event_id).bind(reservation.google_synced_at)
            .bind(reservation.created_at).bind(reservation.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for job in jobs {
            sqlx::query(INSERT_JOB)
                .bind(&job.id).bind(&job.job_type).bind(&job.payload).bind(job.execute_at)
                .bind(&job.status).bind(&job.error_message).bind(job.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_google_event_id(&self, event_id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE google_event_id = ? LIMIT 1")
            .bind(event_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_recent(&self, filter: &ReservationFilter, limit: i64) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR staff_id = ?2)
             ORDER BY datetime DESC LIMIT ?3"
        )
            .bind(filter.status)
            .bind(filter.staff_id.as_deref())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE datetime >= ? AND datetime < ? ORDER BY datetime ASC")
            .bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_for_staff(&self, staff_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE staff_id = ? AND datetime >= ? AND datetime < ? AND status != 'cancelled' ORDER BY datetime ASC"
        )
            .bind(staff_id).bind(start).bind(end)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn history_for_customer(&self, customer_id: &str) -> Result<Vec<HistoryEntry>, AppError> {
        sqlx::query_as::<_, HistoryEntry>(
            "SELECT id, datetime, menu_name AS menu, staff_name AS staff, menu_price AS price, note, status
             FROM reservations WHERE customer_id = ? ORDER BY datetime DESC"
        )
            .bind(customer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_with_jobs(&self, reservation: &Reservation, cancel_kinds: &[JobKind], mut jobs: Vec<Job>) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let stored = sqlx::query_as::<_, (ReservationStatus, Option<String>)>(
            "SELECT status, google_event_id FROM reservations WHERE id = ?"
        )
            .bind(&reservation.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Reservation not found".into()))?;

        // The calendar columns belong to the sync writer, except when the edit cancels.
        let cancelling = reservation.is_cancelled() && stored.0 != ReservationStatus::Cancelled;
        if cancelling
            && let Some(event_id) = stored.1
            && !jobs.iter().any(|j| j.job_type == JobKind::CalendarDelete.as_str())
        {
            jobs.push(Job::calendar_delete(&reservation.id, event_id));
        }

        let updated = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET customer_name=?, phone=?, menu_name=?, menu_price=?, menu_duration=?, staff_id=?, staff_name=?,
                 datetime=?, note=?, status=?,
                 google_event_id = CASE WHEN ? THEN NULL ELSE google_event_id END,
                 google_synced_at = CASE WHEN ? THEN ? ELSE google_synced_at END,
                 updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&reservation.customer_name).bind(&reservation.phone).bind(&reservation.menu_name)
            .bind(reservation.menu_price).bind(reservation.menu_duration).bind(&reservation.staff_id)
            .bind(&reservation.staff_name).bind(reservation.datetime).bind(&reservation.note)
            .bind(reservation.status)
            .bind(cancelling)
            .bind(cancelling).bind(reservation.google_synced_at.unwrap_or_else(Utc::now))
            .bind(Utc::now()).bind(&reservation.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Reservation not found".into()))?;

        for kind in cancel_kinds {
            sqlx::query("UPDATE jobs SET status = 'CANCELLED' WHERE status = 'PENDING' AND job_type = ? AND json_extract(payload, '$.reservation_id') = ?")
                .bind(kind.as_str()).bind(&reservation.id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        for job in jobs {
            sqlx::query(INSERT_JOB)
                .bind(&job.id).bind(&job.job_type).bind(&job.payload).bind(job.execute_at)
                .bind(&job.status).bind(&job.error_message).bind(job.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn set_calendar_sync(&self, id: &str, google_event_id: Option<&str>, synced_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE reservations SET google_event_id = ?, google_synced_at = ? WHERE id = ?")
            .bind(google_event_id).bind(synced_at).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reservation not found".into()));
        }
        Ok(())
    }
}
