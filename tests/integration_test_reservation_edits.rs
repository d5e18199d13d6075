mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use common::{future_date, TestApp};
use salon_booking::domain::models::reservation::ReservationStatus;
use serde_json::{json, Value};

async fn booked(app: &TestApp) -> String {
    let (menu_id, staff_id) = app.seed_catalog().await;
    let (status, reservation) = app.book(&menu_id, &staff_id, "U_edit", future_date(5), "12:00").await;
    assert_eq!(status, StatusCode::CREATED);
    reservation["id"].as_str().unwrap().to_string()
}

async fn jobs_of(app: &TestApp, job_type: &str) -> Vec<Value> {
    let (_, jobs) = app.admin_get("/api/v1/admin/jobs").await;
    jobs.as_array().unwrap().iter().filter(|j| j["jobType"] == job_type).cloned().collect()
}

#[tokio::test]
async fn test_cancel_notifies_customer_and_deletes_event() {
    let app = TestApp::new().await;
    let id = booked(&app).await;
    app.run_jobs().await;

    let (status, cancelled) = app.request("DELETE", &format!("/api/v1/admin/reservations/{}", id), None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert!(cancelled["googleEventId"].is_null());
    assert!(cancelled["googleSyncedAt"].is_string());

    app.run_jobs().await;

    assert_eq!(app.calendar.deleted_ids(), vec!["evt_1".to_string()]);
    // confirmation + cancellation
    assert_eq!(app.messaging.pushed_to("U_edit").len(), 2);

    // The pending hour reminder is withdrawn.
    let reminders = jobs_of(&app, "REMINDER_1H").await;
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0]["status"], "CANCELLED");

    // Rows are kept.
    let (status, _) = app.admin_get(&format!("/api/v1/admin/reservations/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cancel_before_calendar_sync_enqueues_no_delete() {
    let app = TestApp::new().await;
    let id = booked(&app).await;

    // Cancel before the worker has created the event.
    let (status, _) = app.request("DELETE", &format!("/api/v1/admin/reservations/{}", id), None, true).await;
    assert_eq!(status, StatusCode::OK);
    app.run_jobs().await;

    assert!(jobs_of(&app, "CALENDAR_DELETE").await.is_empty());
    assert!(app.calendar.deleted_ids().is_empty());
    assert_eq!(app.calendar.insert_count(), 0);

    // Only the cancellation reaches the customer.
    assert_eq!(app.messaging.pushed_to("U_edit").len(), 1);
}

#[tokio::test]
async fn test_cancelled_reservation_cannot_be_reopened() {
    let app = TestApp::new().await;
    let id = booked(&app).await;
    let uri = format!("/api/v1/admin/reservations/{}", id);

    app.request("DELETE", &uri, None, true).await;

    let (status, _) = app.admin_put(&uri, json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, noted) = app.admin_put(&uri, json!({ "note": "called to apologise" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(noted["note"], "called to apologise");
    assert_eq!(noted["status"], "cancelled");

    let (_, stored) = app.admin_get(&uri).await;
    assert_eq!(stored["note"], "called to apologise");
}

#[tokio::test]
async fn test_reschedule_moves_reminder_and_updates_event() {
    let app = TestApp::new().await;
    let id = booked(&app).await;
    app.run_jobs().await;

    let new_time = Utc::now() + Duration::days(10);
    let (status, moved) = app.admin_put(
        &format!("/api/v1/admin/reservations/{}", id),
        json!({ "datetime": new_time.to_rfc3339() }),
    ).await;
    assert_eq!(status, StatusCode::OK, "{}", moved);

    let reminders = jobs_of(&app, "REMINDER_1H").await;
    assert_eq!(reminders.len(), 2);
    let pending: Vec<&Value> = reminders.iter().filter(|j| j["status"] == "PENDING").collect();
    assert_eq!(pending.len(), 1);
    let execute_at: DateTime<Utc> = pending[0]["executeAt"].as_str().unwrap().parse().unwrap();
    assert_eq!((new_time - execute_at).num_minutes(), 60);

    app.run_jobs().await;
    let updated = app.calendar.updated.lock().unwrap().clone();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, "evt_1");
    assert_eq!(updated[0].1.start.timestamp(), new_time.timestamp());
}

#[tokio::test]
async fn test_completing_a_reservation_skips_the_hour_reminder() {
    let app = TestApp::new().await;
    let id = booked(&app).await;
    app.run_jobs().await;
    let pushed_before = app.messaging.push_count();

    let (status, done) = app.admin_put(&format!("/api/v1/admin/reservations/{}", id), json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");

    app.run_jobs().await;
    assert_eq!(app.messaging.push_count(), pushed_before);
}

#[tokio::test]
async fn test_unchanged_edit_enqueues_nothing() {
    let app = TestApp::new().await;
    let id = booked(&app).await;
    let (_, before) = app.admin_get("/api/v1/admin/jobs").await;

    let (status, _) = app.admin_put(&format!("/api/v1/admin/reservations/{}", id), json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = app.admin_get("/api/v1/admin/jobs").await;
    assert_eq!(before.as_array().unwrap().len(), after.as_array().unwrap().len());
}

#[tokio::test]
async fn test_listing_filters_by_status() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    let (_, first) = app.book(&menu_id, &staff_id, "U_a", future_date(3), "10:00").await;
    app.book(&menu_id, &staff_id, "U_b", future_date(3), "12:00").await;
    app.request("DELETE", &format!("/api/v1/admin/reservations/{}", first["id"].as_str().unwrap()), None, true).await;

    let (_, all) = app.admin_get("/api/v1/admin/reservations").await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, cancelled) = app.admin_get("/api/v1/admin/reservations?status=cancelled").await;
    let cancelled = cancelled.as_array().unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0]["lineUserId"], "U_a");

    let (_, by_staff) = app.admin_get(&format!("/api/v1/admin/reservations?staff_id={}", staff_id)).await;
    assert_eq!(by_staff.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_reservation_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app.admin_get("/api/v1/admin/reservations/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("DELETE", "/api/v1/admin/reservations/missing", None, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_from_stale_row_keeps_calendar_link() {
    let app = TestApp::new().await;
    let id = booked(&app).await;
    let mut snapshot = app.state.reservation_repo.find_by_id(&id).await.unwrap().unwrap();
    assert!(snapshot.google_event_id.is_none());

    // The worker links the event after the row was read.
    app.run_jobs().await;

    snapshot.note = "bring photos".into();
    let updated = app.state.reservation_repo.update_with_jobs(&snapshot, &[], Vec::new()).await.unwrap();
    assert_eq!(updated.note, "bring photos");
    assert_eq!(updated.google_event_id.as_deref(), Some("evt_1"));
}

#[tokio::test]
async fn test_cancel_from_stale_row_still_deletes_event() {
    let app = TestApp::new().await;
    let id = booked(&app).await;
    let mut snapshot = app.state.reservation_repo.find_by_id(&id).await.unwrap().unwrap();
    app.run_jobs().await;

    snapshot.status = ReservationStatus::Cancelled;
    let cancelled = app.state.reservation_repo.update_with_jobs(&snapshot, &[], Vec::new()).await.unwrap();
    assert!(cancelled.google_event_id.is_none());
    assert!(cancelled.google_synced_at.is_some());

    app.run_jobs().await;
    assert_eq!(app.calendar.deleted_ids(), vec!["evt_1".to_string()]);
}
