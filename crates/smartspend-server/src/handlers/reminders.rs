//! Reminder handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, SuccessResponse};
use smartspend_core::models::Reminder;

/// GET /api/session/reminders - List reminders
pub async fn list_reminders(State(state): State<Arc<AppState>>) -> Json<Vec<Reminder>> {
    Json(state.session.read().await.reminders().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub title: String,
}

/// POST /api/session/reminders - Add a reminder dated today
///
/// Returns the full list. A blank title leaves it unchanged.
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateReminderRequest>,
) -> Json<Vec<Reminder>> {
    let today = chrono::Local::now().date_naive();
    let mut session = state.session.write().await;
    session.add_reminder(&request.title, today);
    Json(session.reminders().to_vec())
}

/// POST /api/session/reminders/:id/toggle - Flip completion
pub async fn toggle_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Reminder>, AppError> {
    let reminder = state
        .session
        .write()
        .await
        .toggle_reminder(&id)
        .map_err(AppError::from_core)?;
    Ok(Json(reminder))
}

/// DELETE /api/session/reminders/:id - Remove a reminder
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .session
        .write()
        .await
        .delete_reminder(&id)
        .map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}
