//! Router for the mock login API. There is no real authentication,
//! any credentials are accepted.

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Start a fresh dashboard session
async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<public::LoginRequest>,
) -> Result<Json<public::LoginResponse>, ApiError> {
    let session = state
        .write()
        .map_err(|_| anyhow!("Unable to write shared state"))?
        .start_session();
    tracing::info!("Login for {}, session {}", payload.email, session.id());

    Ok(Json(public::LoginResponse {
        session_id: session.id().to_string(),
    }))
}

/// Leave the dashboard, discarding the session
async fn logout(State(state): State<SharedState>) -> Result<StatusCode, ApiError> {
    let ended = state
        .write()
        .map_err(|_| anyhow!("Unable to write shared state"))?
        .end_session();
    if let Some(session) = ended {
        tracing::info!("Logout, discarded session {}", session.id());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}
