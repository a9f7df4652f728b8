//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use smartspend_core::ai::AIBackend;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_host: String,
    pub ai_model: String,
    pub ai_available: bool,
}

/// GET /api/health - Server status and AI backend reachability
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ai_host: state.ai.host().to_string(),
        ai_model: state.ai.model().to_string(),
        ai_available: state.ai.health_check().await,
    })
}
