//! Test utilities for smartspend-core
//!
//! Provides a mock Gemini server that answers `generateContent` requests with
//! canned receipts, insights and chat replies.

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Canned extraction result returned by the mock server
pub const MOCK_RECEIPTS_JSON: &str = r#"[
  {"merchant":"Supermercado Lider","date":"2024-01-15","total":45.9,"category":"Comida","description":"Compra semanal"},
  {"merchant":"Copec","date":"2024-01-16","total":30.0,"category":"Transporte"}
]"#;

pub const MOCK_INSIGHTS: &str = "- Gastas más en **Comida**.\n- Tu gasto diario es estable.\n- Considera un presupuesto semanal.";

pub const MOCK_CHAT_REPLY: &str = "Según tus boletas, tu mayor gasto es en Comida.";

/// Mock Gemini server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Start a server that answers every request with HTTP 500
    pub async fn start_failing() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(failing: bool) -> Self {
        let app = Router::new()
            .route(
                "/v1beta/models/*rest",
                get(handle_model_info).post(handle_generate),
            )
            .with_state(failing);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
        .into_response()
}

/// Model metadata endpoint (health check)
async fn handle_model_info(State(failing): State<bool>, headers: HeaderMap) -> Response {
    if failing {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "mock failure");
    }
    if !headers.contains_key("x-goog-api-key") {
        return error_response(StatusCode::FORBIDDEN, "missing key");
    }
    Json(json!({ "name": "models/gemini-test" })).into_response()
}

/// generateContent endpoint
///
/// Extraction requests carry a `generationConfig`, chat requests a
/// `systemInstruction`; anything else is an insights request.
async fn handle_generate(
    State(failing): State<bool>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    if failing {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "mock failure");
    }
    if !headers.contains_key("x-goog-api-key") {
        return error_response(StatusCode::FORBIDDEN, "missing key");
    }

    let text = if request.get("generationConfig").is_some() {
        MOCK_RECEIPTS_JSON
    } else if request.get("systemInstruction").is_some() {
        MOCK_CHAT_REPLY
    } else {
        MOCK_INSIGHTS
    };

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}
