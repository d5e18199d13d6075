use crate::domain::models::customer::{Customer, CustomerUpdate, CustomerVisit};
use crate::domain::ports::CustomerRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;

pub struct SqliteCustomerRepo {
    pool: SqlitePool,
}

impl SqliteCustomerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY created_at DESC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE EXISTS (SELECT 1 FROM json_each(customers.tags) WHERE json_each.value = ?) ORDER BY created_at DESC"
        )
            .bind(tag).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_birthday(&self, month_day: &str) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE birthday = ?")
            .bind(month_day).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_inactive_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            "SELECT c.* FROM customers c
             JOIN (
                 SELECT customer_id FROM reservations
                 WHERE customer_id IS NOT NULL
                 GROUP BY customer_id
                 HAVING MAX(datetime) < ?
             ) r ON r.customer_id = c.id
             ORDER BY c.id"
        )
            .bind(cutoff).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn record_visit(&self, visit: &CustomerVisit) -> Result<Customer, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (id, name, phone, line_user_id, birthday, tags, last_reservation, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?1, ?4, '[]', ?5, ?6, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 name = CASE WHEN excluded.name = '' THEN customers.name ELSE excluded.name END,
                 phone = CASE WHEN excluded.phone = '' THEN customers.phone ELSE excluded.phone END,
                 birthday = COALESCE(excluded.birthday, customers.birthday),
                 last_reservation = CASE
                     WHEN customers.last_reservation IS NULL OR excluded.last_reservation > customers.last_reservation
                     THEN excluded.last_reservation ELSE customers.last_reservation END,
                 updated_at = excluded.updated_at
             RETURNING *"
        )
            .bind(&visit.id).bind(&visit.name).bind(&visit.phone)
            .bind(&visit.birthday).bind(visit.reserved_at).bind(now)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, id: &str, update: &CustomerUpdate) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            "UPDATE customers SET
                 name = COALESCE(?, name),
                 phone = COALESCE(?, phone),
                 birthday = COALESCE(?, birthday),
                 tags = COALESCE(?, tags),
                 updated_at = ?
             WHERE id = ?
             RETURNING *"
        )
            .bind(&update.name).bind(&update.phone).bind(&update.birthday)
            .bind(update.tags.clone().map(Json)).bind(Utc::now()).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Customer not found".into()))
    }
}
