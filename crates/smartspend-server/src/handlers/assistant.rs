//! Assistant panel handlers
//!
//! Chat turns record the user message under the lock, call the gateway with
//! the lock released, then append the reply. Several turns may overlap.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState};
use smartspend_core::assistant::{AssistantOption, TurnTicket};
use smartspend_core::gateway::{self, CHAT_FAILURE};
use smartspend_core::models::{AssistantMode, ChatMessage, ReceiptRecord, ViewState};
use smartspend_core::session::{OptionOutcome, Session};

#[derive(Serialize)]
pub struct OptionInfo {
    pub id: &'static str,
    /// Text shown while the canned prompt is answered
    pub placeholder: Option<&'static str>,
}

#[derive(Serialize)]
pub struct AssistantResponse {
    pub mode: AssistantMode,
    pub messages: Vec<ChatMessage>,
    pub pending: usize,
    pub view: ViewState,
    pub options: Vec<OptionInfo>,
}

impl From<&Session> for AssistantResponse {
    fn from(session: &Session) -> Self {
        let conversation = session.conversation();
        Self {
            mode: conversation.mode(),
            messages: conversation.messages().to_vec(),
            pending: conversation.pending(),
            view: session.view(),
            options: AssistantOption::ALL
                .iter()
                .map(|o| OptionInfo {
                    id: o.as_str(),
                    placeholder: o.placeholder(),
                })
                .collect(),
        }
    }
}

/// GET /api/session/assistant - Panel state and transcript
pub async fn get_assistant(State(state): State<Arc<AppState>>) -> Json<AssistantResponse> {
    let session = state.session.read().await;
    Json(AssistantResponse::from(&*session))
}

/// POST /api/session/assistant/open - Show the panel
pub async fn open_assistant(State(state): State<Arc<AppState>>) -> Json<AssistantResponse> {
    let mut session = state.session.write().await;
    session.open_assistant();
    Json(AssistantResponse::from(&*session))
}

/// POST /api/session/assistant/close - Hide the panel, keeping the transcript
pub async fn close_assistant(State(state): State<Arc<AppState>>) -> Json<AssistantResponse> {
    let mut session = state.session.write().await;
    session.close_assistant();
    Json(AssistantResponse::from(&*session))
}

/// DELETE /api/session/assistant - Empty the transcript and return to the menu
pub async fn reset_assistant(State(state): State<Arc<AppState>>) -> Json<AssistantResponse> {
    let mut session = state.session.write().await;
    session.reset_assistant();
    Json(AssistantResponse::from(&*session))
}

#[derive(Debug, Deserialize)]
pub struct OptionRequest {
    pub option: String,
}

/// POST /api/session/assistant/option - Pick a menu entry
pub async fn select_assistant_option(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OptionRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    let option: AssistantOption = request
        .option
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let (outcome, records) = {
        let mut session = state.session.write().await;
        let outcome = session.select_option(option);
        (outcome, session.records().to_vec())
    };

    if let OptionOutcome::Turn { ticket, placeholder } = outcome {
        debug!(option = option.as_str(), placeholder, "Sending canned prompt");
        run_turn(&state, ticket, records).await?;
    }

    let session = state.session.read().await;
    Ok(Json(AssistantResponse::from(&*session)))
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

/// POST /api/session/assistant/messages - Send a free-text message
///
/// Blank messages are ignored and the unchanged state is returned.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    let turn = {
        let mut session = state.session.write().await;
        session
            .begin_turn(&request.text)
            .map(|ticket| (ticket, session.records().to_vec()))
    };

    if let Some((ticket, records)) = turn {
        run_turn(&state, ticket, records).await?;
    }

    let session = state.session.read().await;
    Ok(Json(AssistantResponse::from(&*session)))
}

/// Call the advisory gateway and append the reply.
///
/// A configuration error still closes the turn with the fallback text so the
/// conversation stays usable, then surfaces as an error response.
async fn run_turn(
    state: &AppState,
    ticket: TurnTicket,
    records: Vec<ReceiptRecord>,
) -> Result<(), AppError> {
    let result = gateway::chat_turn(&state.ai, &ticket.message, &records, &ticket.history).await;

    let mut session = state.session.write().await;
    match result {
        Ok(reply) => {
            session.complete_turn(&ticket, reply);
            Ok(())
        }
        Err(e) => {
            session.complete_turn(&ticket, CHAT_FAILURE);
            Err(AppError::from_core(e))
        }
    }
}
