mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{future_date, TestApp, STAFF_LINE_ID};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_admin_routes_require_bearer_token() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/v1/admin/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app.router.clone().oneshot(
        Request::builder()
            .uri("/api/v1/admin/reservations")
            .header(header::AUTHORIZATION, "Bearer wrong-token")
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/api/v1/admin/messages/broadcast", json!({ "message": "spam" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.messaging.push_count(), 0);
}

#[tokio::test]
async fn test_catalog_management() {
    let app = TestApp::new().await;

    let (status, _) = app.admin_post("/api/v1/admin/menus", json!({ "name": " ", "price": 1000, "durationMin": 30 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.admin_post("/api/v1/admin/menus", json!({ "name": "Cut", "price": 1000, "durationMin": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.admin_post("/api/v1/admin/menus", json!({ "name": "カラー", "price": 8000, "durationMin": 90, "sortOrder": 2 })).await;
    app.admin_post("/api/v1/admin/menus", json!({ "name": "カット", "price": 4500, "durationMin": 60, "sortOrder": 1 })).await;

    let (_, menus) = app.get("/api/v1/menus").await;
    let names: Vec<&str> = menus.as_array().unwrap().iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["カット", "カラー"]);

    let id = menus[0]["id"].as_str().unwrap();
    let (status, updated) = app.admin_put(&format!("/api/v1/admin/menus/{}", id), json!({ "price": 5000 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 5000);
    assert_eq!(updated["name"], "カット");

    let (status, _) = app.admin_put("/api/v1/admin/staffs/missing", json!({ "name": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_tags_and_birthday_update() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    app.book(&menu_id, &staff_id, "U_tagged", future_date(2), "10:00").await;

    let (status, updated) = app.admin_put("/api/v1/admin/customers/U_tagged", json!({
        "tags": ["VIP", " ", "常連", "VIP"], "birthday": "12/5",
    })).await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["tags"], json!(["VIP", "常連"]));
    assert_eq!(updated["birthday"], "12-05");
    assert_eq!(updated["name"], "田中 花子");

    let (status, _) = app.admin_put("/api/v1/admin/customers/U_tagged", json!({ "birthday": "31-31" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.admin_put("/api/v1/admin/customers/U_nobody", json!({ "name": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_summarises_todays_work() {
    let app = TestApp::new().await;
    let (menu_id, staff_id) = app.seed_catalog().await;
    app.book(&menu_id, &staff_id, "U_dash_1", future_date(2), "10:00").await;
    let (_, cancelled) = app.book(&menu_id, &staff_id, "U_dash_2", future_date(2), "12:00").await;
    app.request("DELETE", &format!("/api/v1/admin/reservations/{}", cancelled["id"].as_str().unwrap()), None, true).await;

    let (status, dashboard) = app.admin_get("/api/v1/admin/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["refreshIntervalSecs"], 30);
    assert_eq!(dashboard["statusCounts"]["confirmed"], 1);
    assert_eq!(dashboard["statusCounts"]["cancelled"], 1);
    assert_eq!(dashboard["dailySales"].as_array().unwrap().len(), 7);
    assert_eq!(dashboard["newCustomersThisMonth"], 2);

    let load = dashboard["staffLoad"].as_array().unwrap();
    assert_eq!(load.len(), 1);
    assert_eq!(load[0]["name"], "山田");
    assert_eq!(load[0]["level"], "available");
}

#[tokio::test]
async fn test_staff_line_id_is_optional() {
    let app = TestApp::new().await;
    let (status, staff) = app.admin_post("/api/v1/admin/staffs", json!({ "name": "佐々木", "lineUserId": "" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(staff["lineUserId"].is_null());

    let (_, seeded) = app.admin_post("/api/v1/admin/staffs", json!({ "name": "山田", "lineUserId": STAFF_LINE_ID })).await;
    assert_eq!(seeded["lineUserId"], STAFF_LINE_ID);
}
