use crate::domain::{models::message_log::MessageLog, ports::MessageLogRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteMessageLogRepo {
    pool: SqlitePool,
}

impl SqliteMessageLogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLogRepository for SqliteMessageLogRepo {
    async fn create(&self, log: &MessageLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO message_logs (id, customer_id, reservation_id, recipient, message_type, channel, body, status, error_message, sent_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&log.id).bind(&log.customer_id).bind(&log.reservation_id).bind(&log.recipient)
            .bind(&log.message_type).bind(&log.channel).bind(&log.body).bind(&log.status)
            .bind(&log.error_message).bind(log.sent_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<MessageLog>, AppError> {
        sqlx::query_as::<_, MessageLog>("SELECT * FROM message_logs ORDER BY sent_at DESC LIMIT ?")
            .bind(limit).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
