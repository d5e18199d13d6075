#![allow(dead_code)]

use salon_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::calendar::{CalendarEvent, CalendarEventDraft},
    domain::models::message::{LineMessage, LineProfile},
    domain::ports::{CalendarService, MessagingService},
    domain::services::templates::load_templates,
    infra::factory::{build_state, connect_sqlite},
    background::run_pending_jobs,
    error::AppError,
};
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const STAFF_LINE_ID: &str = "U_staff_yamada";

#[derive(Default)]
pub struct MockMessaging {
    pub pushes: Mutex<Vec<(String, LineMessage)>>,
    pub failing: Mutex<HashSet<String>>,
    /// Rejects flex pushes so the text fallback path runs.
    pub reject_flex: Mutex<bool>,
}

impl MockMessaging {
    pub fn pushed_to(&self, recipient: &str) -> Vec<LineMessage> {
        self.pushes.lock().unwrap().iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().unwrap().len()
    }

    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().unwrap().insert(recipient.to_string());
    }
}

#[async_trait]
impl MessagingService for MockMessaging {
    async fn push(&self, to: &str, messages: &[LineMessage]) -> Result<(), AppError> {
        if self.failing.lock().unwrap().contains(to) {
            return Err(AppError::messaging("mock push rejected"));
        }
        let flex = messages.iter().any(|m| matches!(m, LineMessage::Flex { .. }));
        if flex && *self.reject_flex.lock().unwrap() {
            return Err(AppError::messaging("mock flex rejected"));
        }
        let mut pushes = self.pushes.lock().unwrap();
        for message in messages {
            pushes.push((to.to_string(), message.clone()));
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<LineProfile, AppError> {
        Ok(LineProfile {
            user_id: user_id.to_string(),
            display_name: "Mock User".to_string(),
            picture_url: None,
            status_message: None,
        })
    }
}

#[derive(Default)]
pub struct MockCalendar {
    pub inserted: Mutex<Vec<(String, CalendarEventDraft)>>,
    pub updated: Mutex<Vec<(String, CalendarEventDraft)>>,
    pub deleted: Mutex<Vec<String>>,
    pub events: Mutex<Vec<CalendarEvent>>,
    pub unavailable: Mutex<bool>,
}

impl MockCalendar {
    pub fn insert_count(&self) -> usize {
        self.inserted.lock().unwrap().len()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn set_events(&self, events: Vec<CalendarEvent>) {
        *self.events.lock().unwrap() = events;
    }

    pub fn go_down(&self) {
        *self.unavailable.lock().unwrap() = true;
    }

    fn check(&self) -> Result<(), AppError> {
        if *self.unavailable.lock().unwrap() {
            return Err(AppError::calendar("503 backendError"));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarService for MockCalendar {
    async fn insert_event(&self, draft: &CalendarEventDraft) -> Result<String, AppError> {
        self.check()?;
        let mut inserted = self.inserted.lock().unwrap();
        let id = format!("evt_{}", inserted.len() + 1);
        inserted.push((id.clone(), draft.clone()));
        Ok(id)
    }

    async fn update_event(&self, event_id: &str, draft: &CalendarEventDraft) -> Result<(), AppError> {
        self.check()?;
        self.updated.lock().unwrap().push((event_id.to_string(), draft.clone()));
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), AppError> {
        self.check()?;
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }

    async fn list_events(&self, _time_min: DateTime<Utc>, _time_max: DateTime<Utc>) -> Result<Vec<CalendarEvent>, AppError> {
        self.check()?;
        Ok(self.events.lock().unwrap().clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub messaging: Arc<MockMessaging>,
    pub calendar: Arc<MockCalendar>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(true).await
    }

    pub async fn without_calendar() -> Self {
        Self::build(false).await
    }

    async fn build(with_calendar: bool) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(db_url.clone()),
            "ADMIN_TOKEN" => Some(ADMIN_TOKEN.to_string()),
            "APP_URL" => Some("http://localhost:3000".to_string()),
            "SALON_NAME" => Some("Salone Ponte".to_string()),
            _ => None,
        })
        .expect("Failed to build test config");

        let pool = connect_sqlite(&config.database_url).await.expect("Failed to prepare test db");

        let messaging = Arc::new(MockMessaging::default());
        let calendar = Arc::new(MockCalendar::default());
        let calendar_port: Option<Arc<dyn CalendarService>> = if with_calendar {
            Some(calendar.clone())
        } else {
            None
        };
        let templates = Arc::new(load_templates().expect("Failed to load templates"));

        let state = Arc::new(build_state(&config, pool.clone(), messaging.clone(), calendar_port, templates));
        let router = create_router(state.clone());

        Self { router, pool, db_filename, state, messaging, calendar }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>, admin: bool) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if admin {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, false).await
    }

    pub async fn admin_get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, true).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body), false).await
    }

    pub async fn admin_post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body), true).await
    }

    pub async fn admin_put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body), true).await
    }

    /// Creates one menu and one staff member with a LINE id. Returns `(menu_id, staff_id)`.
    pub async fn seed_catalog(&self) -> (String, String) {
        let (status, menu) = self.admin_post("/api/v1/admin/menus", json!({
            "name": "カット", "price": 4500, "durationMin": 60, "sortOrder": 1
        })).await;
        assert_eq!(status, StatusCode::CREATED, "menu seed failed: {}", menu);

        let (status, staff) = self.admin_post("/api/v1/admin/staffs", json!({
            "name": "山田", "role": "stylist", "lineUserId": STAFF_LINE_ID, "sortOrder": 1
        })).await;
        assert_eq!(status, StatusCode::CREATED, "staff seed failed: {}", staff);

        (menu["id"].as_str().unwrap().to_string(), staff["id"].as_str().unwrap().to_string())
    }

    pub async fn book(&self, menu_id: &str, staff_id: &str, line_user_id: &str, date: NaiveDate, time: &str) -> (StatusCode, Value) {
        self.post("/api/v1/reservations", json!({
            "lineUserId": line_user_id,
            "customerName": "田中 花子",
            "phone": "090-1234-5678",
            "menuId": menu_id,
            "staffId": staff_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time,
        })).await
    }

    /// Drains every due job.
    pub async fn run_jobs(&self) {
        while run_pending_jobs(&self.state).await > 0 {}
    }
}

/// A salon-local date far enough ahead that every slot is bookable.
pub fn future_date(days: i64) -> NaiveDate {
    Utc::now().with_timezone(&chrono_tz::Asia::Tokyo).date_naive() + Duration::days(days)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
