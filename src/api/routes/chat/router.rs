//! Router for the chat API

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use super::public;
use crate::ai::chat::{ChatSession, RejectReason};
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

fn active_session(state: &SharedState) -> Result<Option<Arc<ChatSession>>, ApiError> {
    let state = state
        .read()
        .map_err(|_| anyhow!("Unable to read shared state"))?;
    Ok(state.session.clone())
}

fn no_session() -> axum::response::Response {
    (StatusCode::NOT_FOUND, "No active chat session").into_response()
}

/// Get the transcript, busy flag and draft of the active session
async fn chat_view(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let Some(session) = active_session(&state)? else {
        return Ok(no_session());
    };

    let resp = public::ChatViewResponse {
        session_id: session.id().to_string(),
        busy: session.is_busy(),
        draft: session.draft(),
        transcript: session.snapshot().to_vec(),
    };
    Ok(Json(resp).into_response())
}

/// Replace the not yet submitted input text
async fn chat_draft(
    State(state): State<SharedState>,
    Json(payload): Json<public::DraftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(session) = active_session(&state)? else {
        return Ok(no_session());
    };
    session.update_draft(&payload.text);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Submit a message. The answer is appended to the transcript in the
/// background, poll the chat view to pick it up.
async fn chat_submit(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(session) = active_session(&state)? else {
        return Ok(no_session());
    };

    let resp = match session.spawn_submit(&payload.message) {
        Ok(_handle) => public::SubmitResponse {
            accepted: true,
            reason: None,
        },
        Err(reason) => {
            let reason = match reason {
                RejectReason::EmptyInput => "empty_input",
                RejectReason::AlreadyBusy => "already_busy",
            };
            tracing::debug!("Session {}: ignored message ({})", session.id(), reason);
            public::SubmitResponse {
                accepted: false,
                reason: Some(reason.to_string()),
            }
        }
    };

    Ok((StatusCode::ACCEPTED, Json(resp)).into_response())
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(chat_view).post(chat_submit))
        .route("/draft", put(chat_draft))
}
