use chrono::NaiveDate;
use serde::Serialize;
use crate::domain::services::availability::{DayAvailability, SlotAvailability};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub staff_id: String,
    pub slots: Vec<SlotAvailability>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAvailabilityResponse {
    pub month: String,
    pub staff_id: String,
    pub days: Vec<DayAvailability>,
}

#[derive(Serialize)]
pub struct CustomerExistsResponse {
    pub exists: bool,
}

#[derive(Serialize)]
pub struct SendResponse {
    pub success: bool,
}
