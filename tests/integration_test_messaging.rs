mod common;

use axum::http::StatusCode;
use common::{future_date, TestApp};
use salon_booking::domain::models::customer::CustomerUpdate;
use salon_booking::domain::models::message::LineMessage;
use serde_json::json;

async fn seed_customers(app: &TestApp, ids: &[&str]) {
    let (menu_id, staff_id) = app.seed_catalog().await;
    for (i, id) in ids.iter().enumerate() {
        let time = format!("{}:00", 10 + i);
        let (status, _) = app.book(&menu_id, &staff_id, id, future_date(3), &time).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_broadcast_counts_failures_without_aborting() {
    let app = TestApp::new().await;
    app.messaging.fail_for("U_broken");

    let (status, report) = app.admin_post("/api/v1/admin/messages/broadcast", json!({
        "userIds": ["U_1", "U_broken", "", "U_2"],
        "message": "本日は臨時休業です",
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({ "total": 4, "success": 2, "failed": 2 }));

    assert_eq!(app.messaging.pushed_to("U_1").len(), 1);
    assert_eq!(app.messaging.pushed_to("U_2").len(), 1);
    assert!(app.messaging.pushed_to("").is_empty());

    let (_, logs) = app.admin_get("/api/v1/admin/messages/logs").await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 3);
    let failed = logs.iter().find(|l| l["recipient"] == "U_broken").unwrap();
    assert_eq!(failed["status"], "failed");
    assert_eq!(failed["messageType"], "broadcast");
    assert!(failed["errorMessage"].is_string());
}

#[tokio::test]
async fn test_broadcast_without_ids_reaches_every_customer() {
    let app = TestApp::new().await;
    seed_customers(&app, &["U_a", "U_b", "U_c"]).await;

    let (_, report) = app.admin_post("/api/v1/admin/messages/broadcast", json!({ "message": "hello" })).await;
    assert_eq!(report["total"], 3);
    assert_eq!(report["success"], 3);
}

#[tokio::test]
async fn test_broadcast_by_tag() {
    let app = TestApp::new().await;
    seed_customers(&app, &["U_vip", "U_regular"]).await;

    let update = CustomerUpdate { tags: Some(vec!["VIP".into()]), ..Default::default() };
    app.state.customer_repo.update("U_vip", &update).await.unwrap();

    let (_, report) = app.admin_post("/api/v1/admin/messages/broadcast", json!({
        "tag": "VIP", "message": "VIP限定のご案内",
    })).await;
    assert_eq!(report["total"], 1);
    assert_eq!(app.messaging.pushed_to("U_vip").iter().filter(|m| matches!(m, LineMessage::Text { .. })).count(), 1);
}

#[tokio::test]
async fn test_send_flex_message() {
    let app = TestApp::new().await;
    let bubble = json!({
        "type": "bubble",
        "body": { "type": "box", "layout": "vertical", "contents": [{ "type": "text", "text": "hi" }] }
    });

    let (status, body) = app.admin_post("/api/v1/admin/messages/send", json!({
        "userId": "U_flex", "type": "flex", "message": bubble.to_string(), "altText": "お知らせ",
    })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);

    let pushed = app.messaging.pushed_to("U_flex");
    assert!(matches!(&pushed[0], LineMessage::Flex { alt_text, .. } if alt_text == "お知らせ"));
}

#[tokio::test]
async fn test_send_rejects_malformed_flex_and_empty_text() {
    let app = TestApp::new().await;

    let (status, _) = app.admin_post("/api/v1/admin/messages/send", json!({
        "userId": "U_1", "type": "flex", "message": "{not json",
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.admin_post("/api/v1/admin/messages/send", json!({ "userId": "U_1", "message": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.admin_post("/api/v1/admin/messages/send", json!({ "userId": "", "message": "hi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.messaging.push_count(), 0);
}

#[tokio::test]
async fn test_templates_preview_and_broadcast() {
    let app = TestApp::new().await;

    let (_, templates) = app.admin_get("/api/v1/admin/messages/templates").await;
    let names: Vec<&str> = templates.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["promotion", "thankyou"]);

    let (status, preview) = app.admin_get("/api/v1/admin/messages/templates/promotion/preview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["type"], "flex");
    assert_eq!(preview["contents"]["type"], "bubble");

    let (status, _) = app.admin_get("/api/v1/admin/messages/templates/unknown/preview").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, report) = app.admin_post("/api/v1/admin/messages/templates/thankyou/broadcast", json!({
        "userIds": ["U_t1", "U_t2"],
        "data": { "customerName": "田中", "todayMenu": "カラー" },
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["success"], 2);

    let (_, logs) = app.admin_get("/api/v1/admin/messages/logs?limit=1").await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["messageType"], "template");
}

#[tokio::test]
async fn test_profile_lookup() {
    let app = TestApp::new().await;
    let (status, profile) = app.admin_get("/api/v1/admin/messages/profile/U_someone").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["userId"], "U_someone");
    assert_eq!(profile["displayName"], "Mock User");
}
