use std::collections::HashMap;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use crate::domain::models::reservation::ReservationStatus;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub line_user_id: Option<String>,
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub menu_id: Option<String>,
    pub staff_id: Option<String>,
    /// `YYYY-MM-DD` in the salon's zone
    pub date: Option<String>,
    /// `HH:MM`
    pub time: Option<String>,
    #[serde(default)]
    pub note: String,
    pub birthday: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    pub status: Option<ReservationStatus>,
    pub datetime: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ListReservationsParams {
    pub status: Option<ReservationStatus>,
    pub staff_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SlotsParams {
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct AvailabilityParams {
    /// `YYYY-MM`
    pub month: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuRequest {
    pub name: String,
    pub price: i64,
    pub duration_min: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub duration_min: Option<i64>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub specialty: String,
    pub line_user_id: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub specialty: Option<String>,
    pub line_user_id: Option<String>,
    pub sort_order: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Flex,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub user_id: String,
    /// Text body, or the flex container as a JSON string.
    pub message: String,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
    pub alt_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub user_ids: Option<Vec<String>>,
    pub tag: Option<String>,
    pub message: String,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
    pub alt_text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBroadcastRequest {
    pub user_ids: Option<Vec<String>>,
    pub tag: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

#[derive(Deserialize, Default)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Deserialize, Default)]
pub struct SweepRequest {
    pub date: Option<NaiveDate>,
}
