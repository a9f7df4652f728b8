//! Gateway calls with the user-facing failure policy applied
//!
//! The backends report raw errors. This layer decides what the user sees:
//! extraction failures collapse into one retry message, advisory failures
//! become fallback text. Configuration errors always propagate so a missing
//! API key is never disguised as a flaky network.

use tracing::{info, warn};

use crate::ai::AIBackend;
use crate::error::{Error, Result};
use crate::models::{ChatMessage, ImagePayload, ReceiptRecord};

pub const EMPTY_SELECTION_MESSAGE: &str = "Por favor sube al menos una imagen.";
pub const EXTRACTION_RETRY_MESSAGE: &str =
    "Hubo un error analizando las boletas. Intenta nuevamente.";

pub const INSIGHTS_FAILURE: &str = "No se pudieron cargar los insights en este momento.";
pub const INSIGHTS_EMPTY: &str = "No se pudieron generar insights.";

pub const CHAT_FAILURE: &str = "Ups, tuve un problema conectando con mi cerebro digital.";
pub const CHAT_EMPTY: &str = "Lo siento, no entendí eso.";

/// Extract a batch of records. One attempt, no retry.
///
/// An empty image list is rejected without calling the backend.
pub async fn extract_batch<B: AIBackend + ?Sized>(
    backend: &B,
    files: &[ImagePayload],
) -> Result<Vec<ReceiptRecord>> {
    if files.is_empty() {
        return Err(Error::Validation(EMPTY_SELECTION_MESSAGE.into()));
    }

    match backend.extract_receipts(files).await {
        Ok(records) => {
            info!(images = files.len(), records = records.len(), "Extracted receipts");
            Ok(records)
        }
        Err(e) if e.is_config() => Err(e),
        Err(e) => {
            warn!(error = %e, images = files.len(), model = backend.model(), "Receipt extraction failed");
            Err(Error::Extraction(EXTRACTION_RETRY_MESSAGE.into()))
        }
    }
}

/// Narrative insights for the records, or a fallback text
pub async fn summarize<B: AIBackend + ?Sized>(
    backend: &B,
    records: &[ReceiptRecord],
) -> Result<String> {
    match backend.generate_insights(records).await {
        Ok(text) if text.trim().is_empty() => Ok(INSIGHTS_EMPTY.to_string()),
        Ok(text) => Ok(text),
        Err(e) if e.is_config() => Err(e),
        Err(e) => {
            warn!(error = %e, records = records.len(), "Insights request failed");
            Ok(INSIGHTS_FAILURE.to_string())
        }
    }
}

/// One conversational turn, or a fallback reply
pub async fn chat_turn<B: AIBackend + ?Sized>(
    backend: &B,
    message: &str,
    records: &[ReceiptRecord],
    history: &[ChatMessage],
) -> Result<String> {
    match backend.chat(message, records, history).await {
        Ok(text) if text.trim().is_empty() => Ok(CHAT_EMPTY.to_string()),
        Ok(text) => Ok(text),
        Err(e) if e.is_config() => Err(e),
        Err(e) => {
            warn!(error = %e, history = history.len(), "Chat request failed");
            Ok(CHAT_FAILURE.to_string())
        }
    }
}
