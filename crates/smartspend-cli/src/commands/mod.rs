//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `records` - Records file load/save shared by the other commands
//! - `analyze` - Receipt extraction from image files
//! - `dashboard` - Summary, charts and AI insights
//! - `export` - CSV export and clearing the history
//! - `serve` - Web server command

pub mod analyze;
pub mod dashboard;
pub mod export;
pub mod records;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use dashboard::*;
pub use export::*;
pub use records::*;
pub use serve::*;
