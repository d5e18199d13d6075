use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessageLog {
    pub id: String,
    pub customer_id: Option<String>,
    pub reservation_id: Option<String>,
    pub recipient: String,
    /// Notification kind, e.g. `confirmation` or `broadcast`.
    pub message_type: String,
    /// `text` or `flex`
    pub channel: String,
    pub body: String,
    pub status: String,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl MessageLog {
    pub fn new(recipient: &str, message_type: &str, channel: &str, body: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: None,
            reservation_id: None,
            recipient: recipient.to_string(),
            message_type: message_type.to_string(),
            channel: channel.to_string(),
            body,
            status: STATUS_SENT.to_string(),
            error_message: None,
            sent_at: Utc::now(),
        }
    }
}
