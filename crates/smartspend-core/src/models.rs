//! Domain models for SmartSpend

use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One extracted receipt
///
/// Records are produced by the extraction gateway and never mutated afterwards.
/// `category` is an open vocabulary chosen by the model, so it stays a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Merchant name exactly as extracted (case and whitespace preserved)
    pub merchant: String,
    /// Purchase date, `YYYY-MM-DD`
    pub date: String,
    /// Amount in the user's implicit currency
    pub total: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReceiptRecord {
    pub fn new(
        merchant: impl Into<String>,
        date: impl Into<String>,
        total: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            merchant: merchant.into(),
            date: date.into(),
            total,
            category: category.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the field constraints of a record
    pub fn validate(&self) -> Result<()> {
        if self.merchant.trim().is_empty() {
            return Err(Error::InvalidData("Receipt merchant is empty".into()));
        }
        if !is_canonical_date(&self.date) {
            return Err(Error::InvalidData(format!(
                "Receipt date '{}' is not YYYY-MM-DD",
                self.date
            )));
        }
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(Error::InvalidData(format!(
                "Receipt total {} must be a non-negative number",
                self.total
            )));
        }
        Ok(())
    }
}

/// True when `s` is a real calendar date written as zero-padded `YYYY-MM-DD`.
///
/// Daily totals sort dates by string comparison, which is only chronological
/// for this fixed-width form.
pub fn is_canonical_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    digits_ok && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// A receipt image ready to send to the extraction gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Base64-encoded image bytes (no `data:` URL prefix)
    pub data: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Accepts either raw base64 or a full `data:<mime>;base64,<data>` URL
    pub fn from_data_url(input: &str, fallback_mime: &str) -> Self {
        match input
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
        {
            Some((mime, data)) => Self {
                data: data.to_string(),
                mime_type: mime.to_string(),
            },
            None => Self {
                data: input.to_string(),
                mime_type: fallback_mime.to_string(),
            },
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| Error::InvalidData(format!("Invalid base64 image data: {}", e)))
    }
}

/// Fixed catalog of dashboard charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// Spend per category
    CategoryPie,
    /// Top five merchants by spend
    MerchantBar,
    /// Spend per day
    DailyTrend,
    /// Purchases per category
    CategoryCount,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [
        ChartType::CategoryPie,
        ChartType::MerchantBar,
        ChartType::DailyTrend,
        ChartType::CategoryCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CategoryPie => "category_pie",
            Self::MerchantBar => "merchant_bar",
            Self::DailyTrend => "daily_trend",
            Self::CategoryCount => "category_count",
        }
    }
}

impl std::str::FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category_pie" => Ok(Self::CategoryPie),
            "merchant_bar" => Ok(Self::MerchantBar),
            "daily_trend" => Ok(Self::DailyTrend),
            "category_count" => Ok(Self::CategoryCount),
            _ => Err(format!("Unknown chart type: {}", s)),
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reminder priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// A session-local payment reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub priority: Priority,
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One turn of the assistant conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Screen currently shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    #[default]
    Upload,
    Dashboard,
    Reminders,
}

/// State of the floating assistant panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    /// Panel closed
    #[default]
    Idle,
    /// Panel open on the option menu
    Menu,
    /// Panel open on the conversation
    Chat,
}
