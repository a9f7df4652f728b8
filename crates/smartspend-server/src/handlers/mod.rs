//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analyze;
pub mod assistant;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod receipts;
pub mod reminders;
pub mod session;
pub mod uploads;

// Re-export all handlers for use in router
pub use analyze::*;
pub use assistant::*;
pub use dashboard::*;
pub use export::*;
pub use health::*;
pub use receipts::*;
pub use reminders::*;
pub use session::*;
pub use uploads::*;
