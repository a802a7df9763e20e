//! API routes module

pub mod auth;
pub mod chat;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

type SharedState = Arc<RwLock<AppState>>;

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Mock login and logout
        .merge(auth::router())
        // Dashboard chat routes
        .nest("/chat", chat::router())
        .route("/health", get(health))
}
