//! SmartSpend Web Server
//!
//! Axum-based REST API for the SmartSpend receipt assistant.
//!
//! Two surfaces are exposed:
//! - `POST /api/analyzeReceipts`: stateless batch extraction
//! - `/api/session/...`: the session controller (uploads, dashboard,
//!   insights, assistant, reminders, export)
//!
//! The session lives behind a `tokio::sync::RwLock`. Handlers never hold the
//! lock while a gateway call is in flight.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use smartspend_core::ai::{AIBackend, AIClient};
use smartspend_core::session::Session;
use smartspend_core::Error as CoreError;

mod handlers;

/// Maximum request body size (20 MB of base64 images)
pub const MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `SMARTSPEND_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("SMARTSPEND_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

/// Shared application state
pub struct AppState {
    pub session: RwLock<Session>,
    pub ai: AIClient,
}

/// Undo for a session flag raised before a gateway call.
///
/// If the request future is dropped while the call is pending (client went
/// away, request timed out) the reset runs on drop. `disarm` once the result
/// has been applied.
pub(crate) struct PendingCallGuard {
    state: Arc<AppState>,
    reset: Option<fn(&mut Session)>,
}

impl PendingCallGuard {
    pub(crate) fn new(state: Arc<AppState>, reset: fn(&mut Session)) -> Self {
        Self {
            state,
            reset: Some(reset),
        }
    }

    pub(crate) fn disarm(mut self) {
        self.reset = None;
    }
}

impl Drop for PendingCallGuard {
    fn drop(&mut self) {
        let Some(reset) = self.reset.take() else {
            return;
        };
        warn!("Request dropped while a gateway call was pending");

        if let Ok(mut session) = self.state.session.try_write() {
            reset(&mut *session);
            return;
        }
        // Lock is busy; finish the reset once it frees up
        let state = self.state.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                reset(&mut *state.session.write().await);
            });
        }
    }
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router, picking the AI backend from the environment
pub fn create_router(static_dir: Option<&str>, config: ServerConfig) -> Router {
    let ai = AIClient::from_env();
    info!(
        "AI backend configured: {} (model: {})",
        ai.host(),
        ai.model()
    );
    create_router_with_ai(ai, static_dir, config)
}

/// Create the application router with an explicit AI backend (for testing)
pub fn create_router_with_ai(ai: AIClient, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        session: RwLock::new(Session::new()),
        ai,
    });

    let session_routes = Router::new()
        .route("/", get(handlers::get_session))
        .route("/view", put(handlers::set_view))
        // Records
        .route(
            "/receipts",
            get(handlers::list_receipts)
                .post(handlers::load_receipts)
                .delete(handlers::clear_receipts),
        )
        // Upload selection
        .route(
            "/uploads",
            get(handlers::get_uploads)
                .post(handlers::add_uploads)
                .delete(handlers::clear_uploads),
        )
        .route("/uploads/submit", post(handlers::submit_uploads))
        .route("/uploads/:index", delete(handlers::remove_upload))
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/charts", get(handlers::get_charts))
        .route("/charts/:id/toggle", post(handlers::toggle_chart))
        .route("/insights", get(handlers::get_insights))
        // Assistant
        .route(
            "/assistant",
            get(handlers::get_assistant).delete(handlers::reset_assistant),
        )
        .route("/assistant/open", post(handlers::open_assistant))
        .route("/assistant/close", post(handlers::close_assistant))
        .route("/assistant/option", post(handlers::select_assistant_option))
        .route("/assistant/messages", post(handlers::send_message))
        // Reminders
        .route(
            "/reminders",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route("/reminders/:id", delete(handlers::delete_reminder))
        .route("/reminders/:id/toggle", post(handlers::toggle_reminder))
        // Export
        .route("/export", get(handlers::export_receipts));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/analyzeReceipts",
            post(handlers::analyze_receipts).fallback(handlers::method_not_allowed),
        )
        .nest("/session", session_routes);

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    // CSP: same-origin scripts, inline styles, data:/blob: images for receipt previews
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the front end if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(host: &str, port: u16, static_dir: Option<&str>) -> anyhow::Result<()> {
    serve_with_config(host, port, static_dir, ServerConfig::from_env()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let ai = AIClient::from_env();
    check_ai_connection(&ai).await;

    let app = create_router_with_ai(ai, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: &AIClient) {
    if let AIClient::Gemini(gemini) = ai {
        if !gemini.has_api_key() {
            warn!("⚠️  GEN_API_KEY not set - extraction and assistant calls will fail");
            return;
        }
    }

    if ai.health_check().await {
        info!("✅ AI backend connected: {} (model: {})", ai.host(), ai.model());
    } else {
        warn!(
            "⚠️  AI backend configured but not responding: {} (model: {})",
            ai.host(),
            ai.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error to a status code. Messages meant for the user
    /// (validation, retry text, missing key) are passed through.
    pub fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::bad_request(&msg),
            CoreError::NotFound(msg) => Self::not_found(&format!("{} not found", msg)),
            CoreError::Extraction(msg) | CoreError::Advisory(msg) => Self::internal(&msg),
            CoreError::Config(msg) => Self::internal(&format!("Configuration error: {}", msg)),
            other => Self::from(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
