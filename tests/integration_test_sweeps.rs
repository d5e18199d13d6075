mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, NaiveDate};
use common::{future_date, TestApp};
use salon_booking::domain::models::message::LineMessage;
use serde_json::json;

#[tokio::test]
async fn test_reminder_sweep_targets_tomorrows_confirmed_reservations() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    let tomorrow = future_date(1);

    app.book(&menu_id, &staff_id, "U_tomorrow", tomorrow, "15:00").await;
    app.book(&menu_id, &staff_id, "U_later", future_date(4), "15:00").await;
    let (_, cancelled) = app.book(&menu_id, &staff_id, "U_cancelled", tomorrow, "11:00").await;
    app.request("DELETE", &format!("/api/v1/admin/reservations/{}", cancelled["id"].as_str().unwrap()), None, true).await;

    let today = tomorrow - Duration::days(1);
    let (status, report) = app.admin_post(&format!("/api/v1/admin/sweeps/reminder?date={}", today), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({ "kind": "reminder", "targeted": 1, "sent": 1, "failed": 0 }));

    let pushed = app.messaging.pushed_to("U_tomorrow");
    assert_eq!(pushed.len(), 1);
    assert!(matches!(&pushed[0], LineMessage::Flex { .. }));
    assert!(app.messaging.pushed_to("U_later").is_empty());
    assert!(app.messaging.pushed_to("U_cancelled").is_empty());
}

#[tokio::test]
async fn test_reminder_sweep_counts_missing_line_id_as_failed() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    let tomorrow = future_date(1);
    app.post("/api/v1/reservations", json!({
        "customerName": "電話予約", "phone": "03-1111-1111",
        "menuId": menu_id, "staffId": staff_id,
        "date": tomorrow.to_string(), "time": "17:00",
    })).await;

    let today = tomorrow - Duration::days(1);
    let (_, report) = app.admin_post(&format!("/api/v1/admin/sweeps/reminder?date={}", today), json!({})).await;
    assert_eq!(report["targeted"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(app.messaging.push_count(), 0);
}

#[tokio::test]
async fn test_birthday_sweep_matches_month_and_day() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    for (id, birthday) in [("U_april", "04-02"), ("U_may", "05-02")] {
        app.post("/api/v1/reservations", json!({
            "lineUserId": id, "customerName": id, "phone": "090",
            "menuId": menu_id, "staffId": staff_id,
            "date": future_date(3).to_string(), "time": if id == "U_april" { "10:00" } else { "12:00" },
            "birthday": birthday,
        })).await;
    }

    let (_, report) = app.admin_post("/api/v1/admin/sweeps/birthday", json!({ "date": "2031-04-02" })).await;
    assert_eq!(report["targeted"], 1);
    assert_eq!(report["sent"], 1);
    assert_eq!(app.messaging.pushed_to("U_april").len(), 1);
    assert!(app.messaging.pushed_to("U_may").is_empty());
}

#[tokio::test]
async fn test_retention_sweep_targets_lapsed_customers() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    app.book(&menu_id, &staff_id, "U_lapsed", future_date(3), "10:00").await;

    let (_, recent) = app.admin_post(&format!("/api/v1/admin/sweeps/retention?date={}", future_date(30)), json!({})).await;
    assert_eq!(recent["targeted"], 0);

    let (_, lapsed) = app.admin_post(&format!("/api/v1/admin/sweeps/retention?date={}", future_date(120)), json!({})).await;
    assert_eq!(lapsed["targeted"], 1);
    assert_eq!(app.messaging.pushed_to("U_lapsed").len(), 1);
}

#[tokio::test]
async fn test_seasonal_sweep_only_runs_in_season_months() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    app.book(&menu_id, &staff_id, "U_season", future_date(3), "10:00").await;

    let year = future_date(0).year() + 1;
    let january = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    let (_, off) = app.admin_post(&format!("/api/v1/admin/sweeps/seasonal?date={}", january), json!({})).await;
    assert_eq!(off["targeted"], 0);

    let june = NaiveDate::from_ymd_opt(year, 6, 1).unwrap();
    let (_, on) = app.admin_post(&format!("/api/v1/admin/sweeps/seasonal?date={}", june), json!({})).await;
    assert_eq!(on["targeted"], 1);
    assert_eq!(on["sent"], 1);
}

#[tokio::test]
async fn test_unknown_sweep_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app.admin_post("/api/v1/admin/sweeps/weekly", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
