//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::ai::chat::Turn;

#[derive(Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize, Serialize)]
pub struct DraftRequest {
    pub text: String,
}

/// Everything needed to render the dashboard chat
#[derive(Deserialize, Serialize)]
pub struct ChatViewResponse {
    pub session_id: String,
    pub busy: bool,
    pub draft: String,
    pub transcript: Vec<Turn>,
}

#[derive(Deserialize, Serialize)]
pub struct SubmitResponse {
    pub accepted: bool,
    // Why the message was ignored, "empty_input" or "already_busy"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
