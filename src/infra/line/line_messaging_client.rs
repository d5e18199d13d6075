use crate::domain::models::message::{LineMessage, LineProfile};
use crate::domain::ports::MessagingService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

pub struct LineMessagingClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl LineMessagingClient {
    pub fn new(api_base: String, access_token: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("HTTP client build error: {}", e)))?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        })
    }
}

#[derive(Serialize)]
struct PushPayload<'a> {
    to: &'a str,
    messages: &'a [LineMessage],
}

#[async_trait]
impl MessagingService for LineMessagingClient {
    async fn push(&self, to: &str, messages: &[LineMessage]) -> Result<(), AppError> {
        let url = format!("{}/v2/bot/message/push", self.api_base);
        debug!("Pushing {} message(s) to {}", messages.len(), to);

        let res = self.client.post(&url)
            .bearer_auth(&self.access_token)
            .json(&PushPayload { to, messages })
            .send()
            .await
            .map_err(|e| {
                error!("LINE push connection error: {}", e);
                AppError::messaging(format!("connection error: {}", e))
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::messaging(format!("push failed. Status: {}, Body: {}", status, text)));
        }

        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<LineProfile, AppError> {
        let url = format!("{}/v2/bot/profile/{}", self.api_base, user_id);

        let res = self.client.get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::messaging(format!("connection error: {}", e)))?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("LINE user {} not found", user_id)));
        }
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::messaging(format!("profile lookup failed. Status: {}, Body: {}", status, text)));
        }

        res.json::<LineProfile>()
            .await
            .map_err(|e| AppError::messaging(format!("profile decode error: {}", e)))
    }
}
