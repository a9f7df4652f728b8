//! Records file shared by the CLI commands
//!
//! The CLI has no server-side session, so records persist between runs in a
//! JSON file holding an array of receipts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use smartspend_core::models::ReceiptRecord;
use smartspend_core::session::Session;

/// Read the records file into a session. A missing file is an empty history.
pub fn open_session(path: &Path) -> Result<Session> {
    let mut session = Session::new();
    if !path.exists() {
        debug!(path = %path.display(), "No records file yet");
        return Ok(session);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file {}", path.display()))?;
    let records: Vec<ReceiptRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid records file {}", path.display()))?;
    session
        .load_records(records)
        .with_context(|| format!("Invalid record in {}", path.display()))?;
    Ok(session)
}

/// Write the session's records back to the file
pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    let json = serde_json::to_string_pretty(session.records())?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write records file {}", path.display()))?;
    debug!(path = %path.display(), records = session.records().len(), "Saved records");
    Ok(())
}

/// Truncate a string to max length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!(
            "{}...",
            s.chars().take(max_len.saturating_sub(3)).collect::<String>()
        )
    }
}

/// Print records as a table
pub fn print_records(records: &[ReceiptRecord]) {
    println!(
        "  {:<10}  {:<24}  {:<14}  {:>10}",
        "Fecha", "Comercio", "Categoría", "Total"
    );
    println!("  {}", "─".repeat(64));
    for r in records {
        println!(
            "  {:<10}  {:<24}  {:<14}  {:>10.2}",
            r.date,
            truncate(&r.merchant, 24),
            truncate(&r.category, 14),
            r.total
        );
    }
}
