use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub role: String,
    pub specialty: String,
    /// Receives new-booking notifications when set.
    pub line_user_id: Option<String>,
    pub sort_order: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Staff {
    pub fn new(name: String, role: String, specialty: String, line_user_id: Option<String>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            role,
            specialty,
            line_user_id,
            sort_order,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn recipient(&self) -> Option<&str> {
        self.line_user_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}
