//! Test utilities for integration tests
#![allow(dead_code)]
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Error, anyhow};
use async_trait::async_trait;
use axum::{Router, body::Body};
use tokio::sync::Notify;

use mrt_assistant::api::AppState;
use mrt_assistant::api::app;
use mrt_assistant::core::{AppConfig, StaticConfig};
use mrt_assistant::gemini::{
    ClientFactory, CompletionClient, CompletionRequest, CompletionResponse,
};

/// A completion client that answers from a fixed script and records
/// every request it receives. An exhausted script answers with an error.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<CompletionResponse, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<CompletionResponse, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Each call waits for a permit on `gate` before answering.
    pub fn gated(script: Vec<Result<CompletionResponse, String>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script)
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn generate_content(&self, req: &CompletionRequest) -> Result<CompletionResponse, Error> {
        self.requests.lock().unwrap().push(req.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(msg)) => Err(anyhow!(msg)),
            None => Err(anyhow!("script exhausted")),
        }
    }
}

/// Hands out the same client every time and counts how often it was
/// asked to.
pub struct CountingFactory {
    client: Arc<ScriptedClient>,
    created: AtomicUsize,
    api_keys: Mutex<Vec<String>>,
}

impl CountingFactory {
    pub fn new(client: Arc<ScriptedClient>) -> Self {
        Self {
            client,
            created: AtomicUsize::new(0),
            api_keys: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.api_keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientFactory for CountingFactory {
    async fn create(&self, api_key: &str) -> Result<Arc<dyn CompletionClient>, Error> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.api_keys.lock().unwrap().push(api_key.to_string());
        let client: Arc<dyn CompletionClient> = self.client.clone();
        Ok(client)
    }
}

/// Fails every construction and counts the attempts.
#[derive(Default)]
pub struct FailingFactory {
    attempts: AtomicUsize,
}

impl FailingFactory {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientFactory for FailingFactory {
    async fn create(&self, _api_key: &str) -> Result<Arc<dyn CompletionClient>, Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("client library failed to load"))
    }
}

pub fn with_key() -> StaticConfig {
    StaticConfig::new().with("GEMINI_API_KEY", "test-api-key")
}

pub fn test_config() -> AppConfig {
    AppConfig {
        gemini_api_hostname: String::from("http://localhost:1"),
        gemini_model: String::from("gemini-test"),
        system_instruction: String::from("You are a helpful campus assistant."),
    }
}

/// Creates a test application router whose sessions talk to `client`.
pub fn test_app(credentials: StaticConfig, client: Arc<ScriptedClient>) -> Router {
    let factory = Arc::new(CountingFactory::new(client));
    let app_state = AppState::with_providers(test_config(), Arc::new(credentials), factory);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
