//! Session overview and navigation

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use smartspend_core::models::ViewState;
use smartspend_core::session::SessionOverview;

/// GET /api/session - Current view, record count and upload/assistant status
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionOverview> {
    Json(state.session.read().await.overview())
}

#[derive(Debug, Deserialize)]
pub struct SetViewRequest {
    pub view: ViewState,
}

#[derive(Serialize)]
pub struct ViewResponse {
    pub view: ViewState,
}

/// PUT /api/session/view - Navigate between upload, dashboard and reminders
///
/// Asking for the dashboard with no records lands on the upload view.
pub async fn set_view(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetViewRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = state.session.write().await.set_view(request.view);
    Ok(Json(ViewResponse { view }))
}
