//! JSON parsing helpers for AI backend responses
//!
//! Even with a JSON response mime type, models occasionally wrap the payload
//! in a Markdown fence or a sentence. These helpers locate the JSON and
//! check every record before it reaches the store.

use crate::error::{Error, Result};
use crate::models::ReceiptRecord;

/// Truncate long responses for error messages
fn truncate_raw(raw: &str) -> String {
    if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    }
}

/// Parse the extraction response into validated records.
///
/// Accepts a JSON array, or a single object which is treated as a one-record
/// batch. Blank responses yield an empty batch. Any record that fails
/// validation rejects the whole batch.
pub fn parse_receipts_response(response: &str) -> Result<Vec<ReceiptRecord>> {
    let response = response.trim();
    if response.is_empty() {
        return Ok(Vec::new());
    }

    let array = match (response.find('['), response.rfind(']')) {
        (Some(s), Some(e)) if s < e => Some(&response[s..=e]),
        _ => None,
    };

    let records: Vec<ReceiptRecord> = if let Some(json_str) = array {
        serde_json::from_str(json_str).map_err(|e| {
            Error::InvalidData(format!(
                "Invalid receipts JSON from AI: {} | Raw: {}",
                e,
                truncate_raw(json_str)
            ))
        })?
    } else {
        match (response.find('{'), response.rfind('}')) {
            (Some(s), Some(e)) if s < e => {
                let json_str = &response[s..=e];
                let record: ReceiptRecord = serde_json::from_str(json_str).map_err(|e| {
                    Error::InvalidData(format!(
                        "Invalid receipt JSON from AI: {} | Raw: {}",
                        e,
                        truncate_raw(json_str)
                    ))
                })?;
                vec![record]
            }
            _ => {
                return Err(Error::InvalidData(format!(
                    "No JSON found in AI receipts response | Raw: {}",
                    truncate_raw(response)
                )))
            }
        }
    };

    for (i, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|e| Error::InvalidData(format!("Receipt {}: {}", i + 1, e)))?;
    }

    Ok(records)
}
