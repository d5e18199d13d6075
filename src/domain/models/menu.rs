use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// `price` is in yen.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub duration_min: i64,
    pub description: String,
    pub sort_order: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Menu {
    pub fn new(name: String, price: i64, duration_min: i64, description: String, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            price,
            duration_min,
            description,
            sort_order,
            active: true,
            created_at: Utc::now(),
        }
    }
}
