use std::env;
use chrono_tz::Tz;
use thiserror::Error;
use tracing::warn;
use crate::domain::models::salon::SalonProfile;

const DEV_APP_URL: &str = "http://localhost:3000";
const DEV_DATABASE_URL: &str = "sqlite://salon.db?mode=rwc";
const DEV_ADMIN_TOKEN: &str = "dev-admin-token";
const DEV_LINE_TOKEN: &str = "dev-line-channel-access-token";
const DEV_LINE_SECRET: &str = "dev-line-channel-secret";
const PLACEHOLDER_PREFIX: &str = "your_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// `APP_ENV` wins; otherwise any host other than localhost counts as production.
    pub fn detect(app_env: Option<&str>, app_url: Option<&str>) -> Self {
        match app_env.map(str::to_ascii_lowercase).as_deref() {
            Some("production") | Some("prod") => return Environment::Production,
            Some(_) => return Environment::Development,
            None => {}
        }

        let Some(url) = app_url else { return Environment::Development };
        let host = url
            .split("://")
            .nth(1)
            .unwrap_or(url)
            .split(['/', ':'])
            .next()
            .unwrap_or_default();

        if host.is_empty() || host == "localhost" || host == "127.0.0.1" {
            Environment::Development
        } else {
            Environment::Production
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct GoogleCalendarConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub calendar_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub port: u16,
    pub app_url: String,
    pub admin_token: String,
    pub salon_name: String,
    pub timezone: Tz,
    pub line: LineConfig,
    /// `None` disables the calendar mirror.
    pub google: Option<GoogleCalendarConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::detect(lookup("APP_ENV").as_deref(), lookup("APP_URL").as_deref());
        let production = environment == Environment::Production;

        let mut used_fallback = false;
        let mut required = |name: &'static str, fallback: &str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) => Ok(value),
                None if production => Err(ConfigError::Missing(name)),
                None => {
                    used_fallback = true;
                    Ok(fallback.to_string())
                }
            }
        };

        let app_url = required("APP_URL", DEV_APP_URL)?;
        let database_url = required("DATABASE_URL", DEV_DATABASE_URL)?;
        let admin_token = required("ADMIN_TOKEN", DEV_ADMIN_TOKEN)?;
        let channel_access_token = required("LINE_CHANNEL_ACCESS_TOKEN", DEV_LINE_TOKEN)?;
        let channel_secret = required("LINE_CHANNEL_SECRET", DEV_LINE_SECRET)?;

        if used_fallback {
            warn!("Using compiled-in development configuration; set environment variables for production");
        }

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{}' is not a port number", raw),
            })?,
            None => 3000,
        };

        let tz_name = lookup("SALON_TIMEZONE").unwrap_or_else(|| "Asia/Tokyo".to_string());
        let timezone: Tz = tz_name.parse().map_err(|_| ConfigError::Invalid {
            name: "SALON_TIMEZONE",
            reason: format!("unknown timezone '{}'", tz_name),
        })?;

        let google = match (
            lookup("GOOGLE_CLIENT_ID"),
            lookup("GOOGLE_CLIENT_SECRET"),
            lookup("GOOGLE_REFRESH_TOKEN"),
            lookup("GOOGLE_CALENDAR_ID"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token), Some(calendar_id))
                if !client_id.starts_with(PLACEHOLDER_PREFIX) =>
            {
                Some(GoogleCalendarConfig { client_id, client_secret, refresh_token, calendar_id })
            }
            _ if production => return Err(ConfigError::Missing("GOOGLE_CLIENT_ID")),
            _ => {
                warn!("Google Calendar credentials not configured; calendar mirror disabled");
                None
            }
        };

        Ok(Self {
            environment,
            database_url,
            port,
            app_url: app_url.trim_end_matches('/').to_string(),
            admin_token,
            salon_name: lookup("SALON_NAME").unwrap_or_else(|| "Salone Ponte".to_string()),
            timezone,
            line: LineConfig {
                channel_access_token,
                channel_secret,
                api_base: lookup("LINE_API_BASE").unwrap_or_else(|| "https://api.line.me".to_string()),
            },
            google,
        })
    }

    pub fn salon(&self) -> SalonProfile {
        SalonProfile {
            name: self.salon_name.clone(),
            timezone: self.timezone,
            app_url: self.app_url.clone(),
        }
    }
}
