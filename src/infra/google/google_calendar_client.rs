use crate::config::GoogleCalendarConfig;
use crate::domain::models::calendar::{CalendarEvent, CalendarEventDraft};
use crate::domain::ports::CalendarService;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";
const EXPIRY_MARGIN_SECS: i64 = 60;

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

pub struct GoogleCalendarClient {
    client: Client,
    config: GoogleCalendarConfig,
    token: Mutex<Option<CachedToken>>,
}

// Wire types (Calendar API v3)

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReminderOverride {
    method: &'static str,
    minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reminders {
    use_default: bool,
    overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct ExtendedProperties {
    #[serde(default, rename = "private")]
    private_props: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventDateTime,
    end: EventDateTime,
    reminders: Reminders,
    extended_properties: ExtendedProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventRaw {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEventRaw>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl EventDateTime {
    fn at(instant: DateTime<Utc>, time_zone: &str) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: Some(time_zone.to_string()),
        }
    }

    fn instant(&self) -> Option<DateTime<Utc>> {
        self.date_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl From<GoogleEventRaw> for CalendarEvent {
    fn from(raw: GoogleEventRaw) -> Self {
        CalendarEvent {
            id: raw.id,
            summary: raw.summary.unwrap_or_default(),
            start: raw.start.as_ref().and_then(EventDateTime::instant),
            end: raw.end.as_ref().and_then(EventDateTime::instant),
            private_properties: raw.extended_properties.map(|p| p.private_props).unwrap_or_default(),
        }
    }
}

fn event_body(draft: &CalendarEventDraft) -> EventBody<'_> {
    EventBody {
        summary: &draft.summary,
        description: &draft.description,
        start: EventDateTime::at(draft.start, &draft.time_zone),
        end: EventDateTime::at(draft.end, &draft.time_zone),
        reminders: Reminders {
            use_default: false,
            overrides: draft.reminder_minutes.iter().map(|m| ReminderOverride { method: "popup", minutes: *m }).collect(),
        },
        extended_properties: ExtendedProperties { private_props: draft.private_properties.clone() },
    }
}

impl GoogleCalendarClient {
    pub fn new(config: GoogleCalendarConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("HTTP client build error: {}", e)))?;
        Ok(Self { client, config, token: Mutex::new(None) })
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref()
            && cached.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now() {
            return Ok(cached.access_token.clone());
        }

        debug!("Refreshing Google OAuth access token");
        let res = self.client.post(TOKEN_URL)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::calendar(format!("token refresh connection error: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::calendar(format!("token refresh failed. Status: {}, Body: {}", status, text)));
        }

        let token: TokenResponse = res.json().await
            .map_err(|e| AppError::calendar(format!("token decode error: {}", e)))?;
        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        });
        Ok(access_token)
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url, AppError> {
        let mut url = Url::parse(API_BASE).map_err(|e| AppError::InternalWithMsg(e.to_string()))?;
        {
            let mut segments = url.path_segments_mut()
                .map_err(|_| AppError::InternalWithMsg("calendar base url cannot be a base".into()))?;
            segments.pop_if_empty().extend(["calendars", self.config.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn ensure_success(res: reqwest::Response, action: &str) -> Result<reqwest::Response, AppError> {
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        Err(AppError::calendar(format!("{} failed. Status: {}, Body: {}", action, status, text)))
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn insert_event(&self, draft: &CalendarEventDraft) -> Result<String, AppError> {
        let token = self.access_token().await?;
        let res = self.client.post(self.events_url(None)?)
            .bearer_auth(&token)
            .json(&event_body(draft))
            .send()
            .await
            .map_err(|e| AppError::calendar(format!("insert connection error: {}", e)))?;

        let created: GoogleEventRaw = Self::ensure_success(res, "insert").await?
            .json().await
            .map_err(|e| AppError::calendar(format!("insert decode error: {}", e)))?;
        info!("Created calendar event {}", created.id);
        Ok(created.id)
    }

    async fn update_event(&self, event_id: &str, draft: &CalendarEventDraft) -> Result<(), AppError> {
        let token = self.access_token().await?;
        let res = self.client.put(self.events_url(Some(event_id))?)
            .bearer_auth(&token)
            .json(&event_body(draft))
            .send()
            .await
            .map_err(|e| AppError::calendar(format!("update connection error: {}", e)))?;
        Self::ensure_success(res, "update").await?;
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), AppError> {
        let token = self.access_token().await?;
        let res = self.client.delete(self.events_url(Some(event_id))?)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AppError::calendar(format!("delete connection error: {}", e)))?;

        // Already gone on the calendar side.
        if res.status() == reqwest::StatusCode::GONE || res.status() == reqwest::StatusCode::NOT_FOUND {
            info!("Calendar event {} was already deleted", event_id);
            return Ok(());
        }
        Self::ensure_success(res, "delete").await?;
        Ok(())
    }

    async fn list_events(&self, time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Result<Vec<CalendarEvent>, AppError> {
        let token = self.access_token().await?;
        let time_min = time_min.to_rfc3339();
        let time_max = time_max.to_rfc3339();
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(self.events_url(None)?)
                .bearer_auth(&token)
                .query(&[
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("singleEvents", "true"),
                    ("orderBy", "startTime"),
                    ("maxResults", "250"),
                ]);
            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let res = request.send().await
                .map_err(|e| AppError::calendar(format!("list connection error: {}", e)))?;
            let body: EventListResponse = Self::ensure_success(res, "list").await?
                .json().await
                .map_err(|e| AppError::calendar(format!("list decode error: {}", e)))?;

            events.extend(
                body.items.into_iter()
                    .filter(|item| item.status.as_deref() != Some("cancelled"))
                    .map(CalendarEvent::from),
            );

            match body.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(events)
    }
}
