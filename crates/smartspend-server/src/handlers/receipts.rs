//! Record store handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, SuccessResponse};
use smartspend_core::models::{ReceiptRecord, ViewState};

/// GET /api/session/receipts - All records in upload order
pub async fn list_receipts(State(state): State<Arc<AppState>>) -> Json<Vec<ReceiptRecord>> {
    Json(state.session.read().await.records().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct LoadReceiptsRequest {
    pub records: Vec<ReceiptRecord>,
}

#[derive(Serialize)]
pub struct LoadReceiptsResponse {
    pub added: usize,
    pub total: usize,
    pub view: ViewState,
}

/// POST /api/session/receipts - Append previously extracted records
///
/// Every record is validated; one bad record rejects the whole batch.
pub async fn load_receipts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoadReceiptsRequest>,
) -> Result<Json<LoadReceiptsResponse>, AppError> {
    let mut session = state.session.write().await;
    let added = session
        .load_records(request.records)
        .map_err(AppError::from_core)?;

    Ok(Json(LoadReceiptsResponse {
        added,
        total: session.records().len(),
        view: session.view(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// DELETE /api/session/receipts?confirm=true - Discard the whole history
pub async fn clear_receipts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !query.confirm {
        return Err(AppError::bad_request(
            "Clearing the history cannot be undone; pass confirm=true",
        ));
    }

    let mut session = state.session.write().await;
    let discarded = session.records().len();
    session.clear_records();
    info!(discarded, "Receipt history cleared");

    Ok(Json(SuccessResponse { success: true }))
}
