use serde::{Deserialize, Serialize};

/// Push payload for the LINE Messaging API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineMessage {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: FlexContainer,
    },
}

impl LineMessage {
    pub fn text(text: impl Into<String>) -> Self {
        LineMessage::Text { text: text.into() }
    }

    pub fn flex(alt_text: impl Into<String>, contents: FlexContainer) -> Self {
        LineMessage::Flex { alt_text: alt_text.into(), contents }
    }

    pub fn channel(&self) -> &'static str {
        match self {
            LineMessage::Text { .. } => "text",
            LineMessage::Flex { .. } => "flex",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexContainer {
    Bubble(FlexBubble),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexBubble {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<FlexBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<FlexBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<FlexBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexComponent {
    Box(FlexBox),
    Text(FlexText),
    Button(FlexButton),
    Separator(FlexSeparator),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexBox {
    pub layout: String,
    pub contents: Vec<FlexComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_all: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<u32>,
}

impl FlexBox {
    pub fn vertical(contents: Vec<FlexComponent>) -> Self {
        Self::with_layout("vertical", contents)
    }

    pub fn horizontal(contents: Vec<FlexComponent>) -> Self {
        Self::with_layout("horizontal", contents)
    }

    fn with_layout(layout: &str, contents: Vec<FlexComponent>) -> Self {
        Self {
            layout: layout.to_string(),
            contents,
            background_color: None,
            padding_all: None,
            spacing: None,
            margin: None,
            flex: None,
        }
    }

    pub fn background(mut self, color: &str) -> Self {
        self.background_color = Some(color.to_string());
        self
    }

    pub fn padding(mut self, padding: &str) -> Self {
        self.padding_all = Some(padding.to_string());
        self
    }

    pub fn spacing(mut self, spacing: &str) -> Self {
        self.spacing = Some(spacing.to_string());
        self
    }

    pub fn margin(mut self, margin: &str) -> Self {
        self.margin = Some(margin.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<u32>,
}

impl FlexText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: None,
            weight: None,
            color: None,
            align: None,
            margin: None,
            wrap: None,
            flex: None,
        }
    }

    pub fn size(mut self, size: &str) -> Self {
        self.size = Some(size.to_string());
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = Some("bold".to_string());
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn align(mut self, align: &str) -> Self {
        self.align = Some(align.to_string());
        self
    }

    pub fn margin(mut self, margin: &str) -> Self {
        self.margin = Some(margin.to_string());
        self
    }

    pub fn wrap(mut self) -> Self {
        self.wrap = Some(true);
        self
    }

    pub fn flex(mut self, ratio: u32) -> Self {
        self.flex = Some(ratio);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexButton {
    pub action: FlexAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
}

impl FlexButton {
    pub fn link(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            action: FlexAction::Uri { label: label.into(), uri: uri.into() },
            style: Some("primary".to_string()),
            color: None,
            height: None,
            margin: None,
        }
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexAction {
    Uri { label: String, uri: String },
    Message { label: String, text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexSeparator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
}

impl From<FlexBox> for FlexComponent {
    fn from(value: FlexBox) -> Self {
        FlexComponent::Box(value)
    }
}

impl From<FlexText> for FlexComponent {
    fn from(value: FlexText) -> Self {
        FlexComponent::Text(value)
    }
}

impl From<FlexButton> for FlexComponent {
    fn from(value: FlexButton) -> Self {
        FlexComponent::Button(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}
