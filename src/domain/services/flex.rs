use crate::domain::models::message::{
    FlexBox, FlexBubble, FlexButton, FlexComponent, FlexContainer, FlexSeparator, FlexText, LineMessage,
};
use crate::domain::models::salon::SalonProfile;
use crate::domain::services::format::ReservationView;

const GREEN: &str = "#28a745";
const BLUE: &str = "#007bff";
const YELLOW: &str = "#ffc107";
const TEAL: &str = "#17a2b8";
const RED: &str = "#dc3545";
const PINK: &str = "#e91e63";
const PURPLE: &str = "#6f42c1";
const MUTED: &str = "#666666";

/// Entry of the fixed seasonal-promotion table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonalMenu {
    pub season: &'static str,
    pub menu: &'static str,
    pub description: &'static str,
}

fn header(title: &str, color: &str) -> FlexBox {
    FlexBox::vertical(vec![FlexText::new(title).bold().color("#ffffff").size("lg").into()])
        .background(color)
        .padding("lg")
}

fn row(label: &str, value: &str) -> FlexComponent {
    FlexBox::horizontal(vec![
        FlexText::new(label).flex(1).color(MUTED).into(),
        FlexText::new(value).flex(2).bold().wrap().into(),
    ])
    .margin("sm")
    .into()
}

fn separator() -> FlexComponent {
    FlexComponent::Separator(FlexSeparator { margin: Some("lg".to_string()) })
}

fn greeting(name: &str) -> FlexComponent {
    FlexText::new(format!("{}様", name)).bold().size("lg").into()
}

fn note(text: &str) -> FlexComponent {
    FlexText::new(text).size("sm").color(MUTED).margin("md").wrap().into()
}

fn bubble(alt_text: &str, header: FlexBox, body: Vec<FlexComponent>, footer: Vec<FlexComponent>) -> LineMessage {
    LineMessage::flex(
        alt_text,
        FlexContainer::Bubble(FlexBubble {
            header: Some(header),
            body: Some(FlexBox::vertical(body)),
            footer: (!footer.is_empty()).then(|| FlexBox::vertical(footer).spacing("sm")),
        }),
    )
}

pub fn confirmation(view: &ReservationView) -> LineMessage {
    bubble(
        "予約確定のお知らせ",
        header("予約確定", GREEN),
        vec![
            greeting(&view.name),
            FlexText::new("ご予約ありがとうございます！").margin("md").into(),
            separator(),
            FlexBox::vertical(vec![
                row("日時", &view.when()),
                row("メニュー", &view.menu),
                row("担当", &view.staff),
                row("料金", &view.price),
            ])
            .margin("lg")
            .into(),
        ],
        vec![
            FlexButton::link("予約を変更・キャンセル", &view.reservation_url).into(),
            FlexText::new("ご来店をお待ちしております！").size("sm").color(MUTED).align("center").margin("md").into(),
        ],
    )
}

pub fn staff_new_booking(view: &ReservationView) -> LineMessage {
    bubble(
        "新しい予約が入りました",
        header("新規予約", BLUE),
        vec![
            FlexText::new(format!("{}さん", view.staff)).bold().size("lg").into(),
            FlexText::new("新しい予約が入りました").margin("md").into(),
            separator(),
            FlexBox::vertical(vec![
                row("お客様", &view.name),
                row("日時", &view.when()),
                row("メニュー", &view.menu),
            ])
            .margin("lg")
            .into(),
        ],
        vec![FlexButton::link("ダッシュボードで確認", &view.dashboard_url).into()],
    )
}

pub fn day_before_reminder(view: &ReservationView) -> LineMessage {
    bubble(
        "【リマインダー】明日のご予約について",
        header("明日のご予約", YELLOW),
        vec![
            greeting(&view.name),
            FlexText::new("明日のご予約をお忘れなく！").margin("md").into(),
            separator(),
            FlexBox::vertical(vec![
                FlexBox::horizontal(vec![
                    FlexText::new("時間").flex(1).color(MUTED).into(),
                    FlexText::new(&view.time).flex(2).bold().size("xl").color(RED).into(),
                ])
                .margin("sm")
                .into(),
                row("メニュー", &view.menu),
                row("担当", &view.staff),
            ])
            .margin("lg")
            .into(),
            note("※変更・キャンセルは前日までにお願いします"),
        ],
        vec![FlexButton::link("予約を確認する", &view.reservation_url).into()],
    )
}

pub fn hour_before_reminder(view: &ReservationView) -> LineMessage {
    bubble(
        "【リマインダー】1時間後にご予約があります",
        header("もうすぐご予約時間です", TEAL),
        vec![
            greeting(&view.name),
            FlexText::new("1時間後にご予約があります").bold().color(TEAL).margin("md").into(),
            separator(),
            FlexBox::vertical(vec![
                FlexBox::horizontal(vec![
                    FlexText::new("ご予約時間").flex(1).color(MUTED).size("sm").into(),
                    FlexText::new(&view.time).flex(2).bold().size("xxl").color(RED).into(),
                ])
                .margin("sm")
                .into(),
                row("メニュー", &view.menu),
                row("担当", &view.staff),
            ])
            .margin("lg")
            .into(),
            note(&format!("{}でお待ちしております。", view.salon)),
        ],
        vec![],
    )
}

pub fn cancellation(view: &ReservationView) -> LineMessage {
    bubble(
        "予約キャンセルのお知らせ",
        header("予約キャンセル", RED),
        vec![
            greeting(&view.name),
            FlexText::new("以下の予約をキャンセルいたしました。").margin("md").wrap().into(),
            separator(),
            FlexBox::vertical(vec![
                row("日時", &view.when()),
                row("メニュー", &view.menu),
                row("担当", &view.staff),
            ])
            .margin("lg")
            .into(),
            note("またのご予約をお待ちしております。"),
        ],
        vec![FlexButton::link("新しい予約をする", &view.booking_url).into()],
    )
}

pub fn birthday(name: &str, salon: &SalonProfile) -> LineMessage {
    bubble(
        "お誕生日おめでとうございます",
        header("🎉 Happy Birthday! 🎉", PINK),
        vec![
            greeting(name),
            FlexText::new("お誕生日おめでとうございます！").margin("md").into(),
            FlexText::new("特別な日をより美しく✨").margin("md").color(PINK).into(),
            separator(),
            FlexText::new("バースデー特典として、今月末まで全メニュー10%OFFでご利用いただけます！")
                .margin("lg")
                .wrap()
                .into(),
        ],
        vec![FlexButton::link("特典を使って予約する", salon.booking_url()).color(PINK).into()],
    )
}

pub fn retention(name: &str, salon: &SalonProfile) -> LineMessage {
    bubble(
        "お久しぶりです！特別クーポンのご案内",
        header("お久しぶりです！", PURPLE),
        vec![
            greeting(name),
            FlexText::new("お元気でしょうか？しばらくお会いできておりませんが、いかがお過ごしですか？")
                .margin("md")
                .wrap()
                .into(),
            separator(),
            FlexText::new("📢 カムバック特典").bold().color(PURPLE).margin("lg").into(),
            FlexText::new("お久しぶりのお客様限定で、次回ご来店時に使える20%OFFクーポンをプレゼント！")
                .margin("sm")
                .wrap()
                .into(),
            note("※今月末まで有効"),
        ],
        vec![FlexButton::link("特典を使って予約する", salon.booking_url()).color(PURPLE).into()],
    )
}

pub fn seasonal(name: &str, season: &SeasonalMenu, salon: &SalonProfile) -> LineMessage {
    bubble(
        &format!("{}の限定メニューのご案内", season.season),
        header(&format!("{}限定メニュー", season.season), TEAL),
        vec![
            greeting(name),
            FlexText::new(format!("{}の新メニューをご紹介！", season.season)).margin("md").into(),
            separator(),
            FlexText::new(season.menu).bold().size("xl").color(TEAL).margin("lg").into(),
            FlexText::new(season.description).margin("sm").wrap().into(),
            note("期間限定の特別価格でご提供中です✨"),
        ],
        vec![FlexButton::link("詳細を見る・予約する", salon.booking_url()).color(TEAL).into()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::reservation::{NewReservationParams, Reservation, SOURCE_BOOKING};
    use chrono::{TimeZone, Utc};

    fn salon() -> SalonProfile {
        SalonProfile {
            name: "Salone Ponte".into(),
            timezone: chrono_tz::Asia::Tokyo,
            app_url: "https://salon.example.com".into(),
        }
    }

    fn view() -> ReservationView {
        let reservation = Reservation::new(NewReservationParams {
            customer_id: Some("U1".into()),
            line_user_id: Some("U1".into()),
            customer_name: "Tanaka".into(),
            phone: "090-0000-0000".into(),
            menu_id: Some("m1".into()),
            menu_name: "Cut".into(),
            menu_price: 4000,
            menu_duration: Some(60),
            staff_id: Some("s1".into()),
            staff_name: "Yamada".into(),
            datetime: Utc.with_ymd_and_hms(2025, 1, 10, 5, 0, 0).unwrap(),
            note: String::new(),
            source: SOURCE_BOOKING,
        });
        ReservationView::new(&reservation, &salon())
    }

    #[test]
    fn confirmation_bubble_lists_reservation_details() {
        let view = view();
        let json = serde_json::to_string(&confirmation(&view)).unwrap();
        assert!(json.contains("予約確定"));
        assert!(json.contains("#28a745"));
        assert!(json.contains("2025年1月10日金曜日 14:00"));
        assert!(json.contains("¥4,000"));
        assert!(json.contains("Tanaka様"));
        assert!(json.contains(&format!("https://salon.example.com/reservation/{}", view.id)));
    }

    #[test]
    fn staff_bubble_addresses_staff_member() {
        let json = serde_json::to_string(&staff_new_booking(&view())).unwrap();
        assert!(json.contains("Yamadaさん"));
        assert!(json.contains("https://salon.example.com/dashboard.html"));
    }

    #[test]
    fn hour_reminder_has_no_footer() {
        let LineMessage::Flex { contents: FlexContainer::Bubble(bubble), alt_text } = hour_before_reminder(&view()) else {
            panic!("expected flex message");
        };
        assert!(bubble.footer.is_none());
        assert!(alt_text.contains("1時間後"));
    }

    #[test]
    fn seasonal_bubble_names_season() {
        let season = SeasonalMenu { season: "春", menu: "さくらカラー", description: "desc" };
        let LineMessage::Flex { alt_text, .. } = seasonal("Tanaka", &season, &salon()) else {
            panic!("expected flex message");
        };
        assert_eq!(alt_text, "春の限定メニューのご案内");
    }
}
