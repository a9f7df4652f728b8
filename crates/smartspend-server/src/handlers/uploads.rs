//! Upload selection and submission
//!
//! Submission snapshots the selection under the write lock, releases it for
//! the gateway call, then re-acquires it to apply the batch. Other requests
//! keep working while the model reads the receipts. A submission dropped
//! mid-call releases the selection again.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, PendingCallGuard, SuccessResponse};
use smartspend_core::gateway;
use smartspend_core::models::{ImagePayload, ViewState};
use smartspend_core::session::{Session, UploadState};

/// Selected file, without the image bytes
#[derive(Serialize)]
pub struct UploadFileInfo {
    pub index: usize,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Decoded size in bytes (approximate for malformed base64)
    pub size: usize,
}

#[derive(Serialize)]
pub struct UploadsResponse {
    pub files: Vec<UploadFileInfo>,
    pub in_flight: bool,
    pub error: Option<String>,
}

impl From<&UploadState> for UploadsResponse {
    fn from(upload: &UploadState) -> Self {
        Self {
            files: upload
                .files()
                .iter()
                .enumerate()
                .map(|(index, f)| UploadFileInfo {
                    index,
                    mime_type: f.mime_type.clone(),
                    size: f.data.len() / 4 * 3,
                })
                .collect(),
            in_flight: upload.in_flight(),
            error: upload.error().map(String::from),
        }
    }
}

/// GET /api/session/uploads - Current selection and last upload outcome
pub async fn get_uploads(State(state): State<Arc<AppState>>) -> Json<UploadsResponse> {
    let session = state.session.read().await;
    Json(UploadsResponse::from(session.upload()))
}

#[derive(Debug, Deserialize)]
pub struct AddUploadsRequest {
    pub files: Vec<ImagePayload>,
}

/// POST /api/session/uploads - Add images to the selection
pub async fn add_uploads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddUploadsRequest>,
) -> Result<Json<UploadsResponse>, AppError> {
    let mut files = Vec::with_capacity(request.files.len());
    for file in &request.files {
        let payload = ImagePayload::from_data_url(&file.data, &file.mime_type);
        if !payload.mime_type.starts_with("image/") {
            return Err(AppError::bad_request(&format!(
                "Unsupported file type: {}",
                payload.mime_type
            )));
        }
        payload.decode().map_err(AppError::from_core)?;
        files.push(payload);
    }

    let mut session = state.session.write().await;
    session.add_files(files).map_err(AppError::from_core)?;
    Ok(Json(UploadsResponse::from(session.upload())))
}

/// DELETE /api/session/uploads/:index - Remove one image from the selection
pub async fn remove_upload(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<UploadsResponse>, AppError> {
    let mut session = state.session.write().await;
    session.remove_file(index).map_err(AppError::from_core)?;
    Ok(Json(UploadsResponse::from(session.upload())))
}

/// DELETE /api/session/uploads - Empty the selection
pub async fn clear_uploads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .session
        .write()
        .await
        .clear_files()
        .map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub added: usize,
    pub total: usize,
    pub view: ViewState,
}

/// POST /api/session/uploads/submit - Extract the selection and append the records
pub async fn submit_uploads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SubmitResponse>, AppError> {
    let files = state
        .session
        .write()
        .await
        .begin_upload()
        .map_err(AppError::from_core)?;
    let guard = PendingCallGuard::new(state.clone(), Session::abandon_upload);

    let result = gateway::extract_batch(&state.ai, &files).await;

    let mut session = state.session.write().await;
    let outcome = session.finish_upload(result);
    guard.disarm();
    let added = outcome.map_err(AppError::from_core)?;

    Ok(Json(SubmitResponse {
        added,
        total: session.records().len(),
        view: session.view(),
    }))
}
