use std::collections::HashMap;
use serde::Serialize;
use tera::{Context, Tera};
use crate::domain::models::message::FlexContainer;
use crate::domain::models::salon::SalonProfile;
use crate::error::AppError;

pub const TEXT_CONFIRMATION: &str = "text/confirmation.txt";
pub const TEXT_STAFF_NEW_BOOKING: &str = "text/staff_new_booking.txt";
pub const TEXT_REMINDER: &str = "text/reminder.txt";
pub const TEXT_REMINDER_1H: &str = "text/reminder_1h.txt";
pub const TEXT_CANCELLATION: &str = "text/cancellation.txt";
pub const TEXT_BIRTHDAY: &str = "text/birthday.txt";
pub const TEXT_RETENTION: &str = "text/retention.txt";
pub const TEXT_SEASONAL: &str = "text/seasonal.txt";

/// Admin-facing flex template filled from `{{key}}` data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexTemplate {
    pub name: &'static str,
    pub title: &'static str,
    pub fields: &'static [&'static str],
    #[serde(skip)]
    path: &'static str,
}

pub const FLEX_TEMPLATES: [FlexTemplate; 2] = [
    FlexTemplate {
        name: "promotion",
        title: "キャンペーンのお知らせ",
        fields: &["promotionTitle", "promotionDescription", "promotionPeriod", "discount", "bookingUrl"],
        path: "flex/promotion.json",
    },
    FlexTemplate {
        name: "thankyou",
        title: "ご来店ありがとうございました",
        fields: &["customerName", "todayMenu", "thankYouMessage", "bookingUrl", "reviewUrl"],
        path: "flex/thankyou.json",
    },
];

pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (TEXT_CONFIRMATION, include_str!("../../../templates/text/confirmation.txt")),
        (TEXT_STAFF_NEW_BOOKING, include_str!("../../../templates/text/staff_new_booking.txt")),
        (TEXT_REMINDER, include_str!("../../../templates/text/reminder.txt")),
        (TEXT_REMINDER_1H, include_str!("../../../templates/text/reminder_1h.txt")),
        (TEXT_CANCELLATION, include_str!("../../../templates/text/cancellation.txt")),
        (TEXT_BIRTHDAY, include_str!("../../../templates/text/birthday.txt")),
        (TEXT_RETENTION, include_str!("../../../templates/text/retention.txt")),
        (TEXT_SEASONAL, include_str!("../../../templates/text/seasonal.txt")),
        ("flex/promotion.json", include_str!("../../../templates/flex/promotion.json")),
        ("flex/thankyou.json", include_str!("../../../templates/flex/thankyou.json")),
    ])
    .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
    Ok(tera)
}

pub fn render_text<T: Serialize>(tera: &Tera, name: &str, data: &T) -> Result<String, AppError> {
    let context = Context::from_serialize(data)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera context error: {:?}", e)))?;
    tera.render(name, &context)
        .map(|text| text.trim_end().to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))
}

pub fn find_flex_template(name: &str) -> Option<&'static FlexTemplate> {
    FLEX_TEMPLATES.iter().find(|t| t.name == name)
}

pub fn sample_data(template: &FlexTemplate) -> HashMap<String, String> {
    let pairs: &[(&str, &str)] = match template.name {
        "promotion" => &[
            ("promotionTitle", "新春キャンペーン"),
            ("promotionDescription", "新年を美しく迎えませんか？人気のカラーメニューが特別価格でご利用いただけます。"),
            ("promotionPeriod", "1月1日〜1月31日"),
            ("discount", "通常価格より30%OFF"),
        ],
        "thankyou" => &[
            ("customerName", "山田 花子"),
            ("todayMenu", "カット + トリートメント"),
            ("thankYouMessage", "お忙しい中お時間をいただき、ありがとうございました。次回のご来店もお待ちしております。"),
        ],
        _ => &[],
    };
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Missing fields render as empty strings; URL fields fall back to the salon's booking page.
pub fn render_flex_template(
    tera: &Tera,
    template: &FlexTemplate,
    data: &HashMap<String, String>,
    salon: &SalonProfile,
) -> Result<FlexContainer, AppError> {
    let mut context = Context::new();
    for field in template.fields {
        let value = data.get(*field).filter(|v| !v.trim().is_empty()).cloned();
        let value = match (*field, value) {
            (_, Some(v)) => v,
            ("bookingUrl", None) => salon.booking_url(),
            ("reviewUrl", None) => salon.app_url.clone(),
            (_, None) => String::new(),
        };
        context.insert(*field, &value);
    }
    context.insert("salonName", &salon.name);

    let rendered = tera.render(template.path, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;
    serde_json::from_str(&rendered)
        .map_err(|e| AppError::InternalWithMsg(format!("Flex template {} produced invalid JSON: {}", template.name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn salon() -> SalonProfile {
        SalonProfile {
            name: "Salone Ponte".into(),
            timezone: chrono_tz::Asia::Tokyo,
            app_url: "https://salon.example.com".into(),
        }
    }

    #[test]
    fn renders_promotion_with_quotes_escaped() {
        let tera = load_templates().unwrap();
        let template = find_flex_template("promotion").unwrap();
        let mut data = sample_data(template);
        data.insert("promotionTitle".into(), "\"Spring\" sale".into());

        let container = render_flex_template(&tera, template, &data, &salon()).unwrap();
        let value = serde_json::to_value(&container).unwrap();
        assert_eq!(value["header"]["contents"][0]["text"], "\"Spring\" sale");
        assert_eq!(value["footer"]["contents"][0]["action"]["uri"], "https://salon.example.com/index.html");
    }

    #[test]
    fn renders_thankyou_greeting() {
        let tera = load_templates().unwrap();
        let template = find_flex_template("thankyou").unwrap();
        let container = render_flex_template(&tera, template, &sample_data(template), &salon()).unwrap();
        let value = serde_json::to_value(&container).unwrap();
        assert_eq!(value["body"]["contents"][1]["text"], "山田 花子様");
        assert_eq!(value["footer"]["contents"][1]["action"]["uri"], "https://salon.example.com");
    }

    #[test]
    fn text_fallback_omits_empty_note() {
        let tera = load_templates().unwrap();
        let data = json!({
            "salon": "Salone Ponte", "name": "Tanaka", "date": "2025年1月10日金曜日", "time": "14:00",
            "menu": "Cut", "staff": "Yamada", "price": "¥4,000", "duration": 60, "note": ""
        });
        let text = render_text(&tera, TEXT_CONFIRMATION, &data).unwrap();
        assert!(text.starts_with("【予約確定】Salone Ponte"));
        assert!(text.contains("所要時間：約60分"));
        assert!(!text.contains("備考"));
    }

    #[test]
    fn unknown_template_is_absent() {
        assert!(find_flex_template("carousel").is_none());
    }
}
