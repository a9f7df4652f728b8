//! CSV export and clearing the records file

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use smartspend_core::export::{export_filename, export_records_csv};

use super::{open_session, save_session};

/// Write the records as CSV. Returns the file written, or `None` when there
/// was nothing to export.
pub fn cmd_export(records_path: &Path, output: Option<&Path>) -> Result<Option<PathBuf>> {
    let session = open_session(records_path)?;
    if session.records().is_empty() {
        println!("No records to export.");
        return Ok(None);
    }

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(export_filename(chrono::Local::now().date_naive())),
    };

    let csv = export_records_csv(session.records());
    fs::write(&path, csv).with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "✅ Exported {} record(s) to {}",
        session.records().len(),
        path.display()
    );
    Ok(Some(path))
}

pub fn cmd_clear(records_path: &Path, yes: bool) -> Result<()> {
    let mut session = open_session(records_path)?;
    if session.records().is_empty() {
        println!("No records to clear.");
        return Ok(());
    }

    if !yes {
        print!(
            "⚠️  This will delete all {} saved record(s).\n\n",
            session.records().len()
        );
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session.clear_records();
    save_session(records_path, &session)?;
    println!("✅ Records cleared.");
    Ok(())
}
