//! SmartSpend Core Library
//!
//! Shared functionality for the SmartSpend receipt assistant:
//! - Receipt records and the session record store
//! - Dashboard aggregation and the chart catalog
//! - Pluggable AI backends (Gemini, mock) for extraction and advice
//! - Session controller driving uploads, dashboard, assistant and reminders
//! - CSV export

pub mod aggregate;
pub mod ai;
pub mod assistant;
pub mod charts;
pub mod error;
pub mod export;
pub mod gateway;
pub mod models;
pub mod prompts;
pub mod reminders;
pub mod session;
pub mod store;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{aggregate, Aggregation, SpendingSummary};
pub use ai::{AIBackend, AIClient, GeminiBackend, MockBackend};
pub use assistant::{AssistantOption, Conversation, TurnTicket};
pub use charts::{ChartData, ChartDataset, ChartInfo, ChartSelection, CATALOG};
pub use error::{Error, Result};
pub use export::{export_filename, export_records_csv};
pub use models::{
    AssistantMode, ChartType, ChatMessage, ChatRole, ImagePayload, Priority, ReceiptRecord,
    Reminder, ViewState,
};
pub use prompts::{Prompt, PromptId};
pub use reminders::ReminderList;
pub use session::{DashboardView, OptionOutcome, Session, SessionOverview};
pub use store::RecordStore;
