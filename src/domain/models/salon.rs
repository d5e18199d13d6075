use chrono_tz::Tz;

/// Branding and link targets used when rendering messages and calendar events.
#[derive(Debug, Clone)]
pub struct SalonProfile {
    pub name: String,
    pub timezone: Tz,
    pub app_url: String,
}

impl SalonProfile {
    pub fn booking_url(&self) -> String {
        format!("{}/index.html", self.app_url)
    }

    pub fn reservation_url(&self, reservation_id: &str) -> String {
        format!("{}/reservation/{}", self.app_url, reservation_id)
    }

    pub fn dashboard_url(&self) -> String {
        format!("{}/dashboard.html", self.app_url)
    }

    /// `【Salone Ponte】`
    pub fn title_prefix(&self) -> String {
        format!("【{}】", self.name)
    }
}
