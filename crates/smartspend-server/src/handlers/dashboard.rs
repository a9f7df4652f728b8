//! Dashboard, chart selection and insights handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::{AppError, AppState, PendingCallGuard};
use smartspend_core::charts::{ChartInfo, CATALOG};
use smartspend_core::gateway;
use smartspend_core::models::ChartType;
use smartspend_core::session::{DashboardView, Session};

/// GET /api/session/dashboard - Summary plus the selected chart datasets
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.session.read().await.dashboard())
}

#[derive(Serialize)]
pub struct ChartsResponse {
    pub catalog: Vec<ChartInfo>,
    pub selection: Vec<ChartType>,
}

/// GET /api/session/charts - Chart catalog and current selection
pub async fn get_charts(State(state): State<Arc<AppState>>) -> Json<ChartsResponse> {
    let session = state.session.read().await;
    Json(ChartsResponse {
        catalog: CATALOG.to_vec(),
        selection: session.charts().active().to_vec(),
    })
}

#[derive(Serialize)]
pub struct ToggleChartResponse {
    pub id: ChartType,
    pub visible: bool,
    pub selection: Vec<ChartType>,
}

/// POST /api/session/charts/:id/toggle - Show or hide one chart
pub async fn toggle_chart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ToggleChartResponse>, AppError> {
    let id: ChartType = id.parse().map_err(|e: String| AppError::bad_request(&e))?;

    let mut session = state.session.write().await;
    let visible = session.toggle_chart(id);

    Ok(Json(ToggleChartResponse {
        id,
        visible,
        selection: session.charts().active().to_vec(),
    }))
}

#[derive(Serialize)]
pub struct InsightsResponse {
    /// Markdown text; absent when there are no records
    pub insights: Option<String>,
}

/// GET /api/session/insights - Narrative insights for the current records
///
/// Served from cache until the records change. A failed summary yields the
/// fallback text, which is cached like any other answer.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InsightsResponse>, AppError> {
    let request = {
        let mut session = state.session.write().await;
        if let Some(text) = session.cached_insights() {
            debug!("Serving cached insights");
            return Ok(Json(InsightsResponse {
                insights: Some(text.to_string()),
            }));
        }
        match session.insights_request() {
            Some(request) => request,
            None => return Ok(Json(InsightsResponse { insights: None })),
        }
    };

    let guard = PendingCallGuard::new(state.clone(), Session::insights_failed);
    let result = gateway::summarize(&state.ai, &request.records).await;

    let mut session = state.session.write().await;
    guard.disarm();
    match result {
        Ok(text) => {
            session.store_insights(request.revision, text.clone());
            Ok(Json(InsightsResponse {
                insights: Some(text),
            }))
        }
        Err(e) => {
            session.insights_failed();
            Err(AppError::from_core(e))
        }
    }
}
