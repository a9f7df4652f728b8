//! Stateless batch extraction endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};
use smartspend_core::gateway;
use smartspend_core::models::{ImagePayload, ReceiptRecord};

/// Request body for batch extraction
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub files: Vec<ImagePayload>,
}

/// POST /api/analyzeReceipts - Extract records from a batch of receipt images
///
/// Does not touch the session. Accepts raw base64 or `data:` URLs in `data`.
pub async fn analyze_receipts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Vec<ReceiptRecord>>, AppError> {
    let files: Vec<ImagePayload> = request
        .files
        .iter()
        .map(|f| ImagePayload::from_data_url(&f.data, &f.mime_type))
        .collect();

    let records = gateway::extract_batch(&state.ai, &files)
        .await
        .map_err(AppError::from_core)?;

    info!(images = files.len(), records = records.len(), "Analyzed receipt batch");

    Ok(Json(records))
}

/// Any method other than POST on the extraction endpoint
pub async fn method_not_allowed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
}
