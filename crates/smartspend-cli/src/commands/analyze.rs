//! Receipt extraction from image files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use smartspend_core::ai::AIClient;
use smartspend_core::gateway;
use smartspend_core::models::ImagePayload;

use super::{open_session, print_records, save_session};

/// Guess an image media type from the file extension
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Read image files into payloads, in argument order
pub fn read_images(images: &[PathBuf]) -> Result<Vec<ImagePayload>> {
    images
        .iter()
        .map(|path| {
            let mime = image_mime_type(path)
                .with_context(|| format!("Not a supported image: {}", path.display()))?;
            let bytes =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(ImagePayload::from_bytes(&bytes, mime))
        })
        .collect()
}

pub async fn cmd_analyze(
    ai: &AIClient,
    records_path: &Path,
    images: &[PathBuf],
    dry_run: bool,
) -> Result<()> {
    if images.is_empty() {
        bail!(gateway::EMPTY_SELECTION_MESSAGE);
    }

    let mut session = open_session(records_path)?;
    let files = read_images(images)?;
    session.add_files(files)?;

    println!("🔍 Analyzing {} receipt image(s)...", images.len());

    let files = session.begin_upload()?;
    let result = gateway::extract_batch(ai, &files).await;
    let added = session.finish_upload(result)?;

    let new_records = &session.records()[session.records().len() - added..];
    println!();
    print_records(new_records);
    println!();

    if dry_run {
        println!("   (dry run - records not saved)");
    } else {
        save_session(records_path, &session)?;
        println!(
            "✅ Added {} record(s), {} total in {}",
            added,
            session.records().len(),
            records_path.display()
        );
    }

    Ok(())
}
