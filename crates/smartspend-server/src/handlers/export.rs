//! CSV export handler

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode},
};
use tracing::info;

use crate::{AppError, AppState};
use smartspend_core::export::{export_filename, export_records_csv};

/// GET /api/session/export - Download the history as CSV
///
/// Answers 204 with no body when there is nothing to export.
pub async fn export_receipts(
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, AppError> {
    let session = state.session.read().await;
    let records = session.records();

    if records.is_empty() {
        return Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::empty())?);
    }

    let csv = export_records_csv(records);
    let filename = export_filename(chrono::Local::now().date_naive());

    info!(records = records.len(), filename = %filename, "Exporting receipts");

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(csv))?)
}
