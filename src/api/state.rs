use std::sync::Arc;

use crate::ai::chat::ChatSession;
use crate::core::{AppConfig, ConfigProvider, EnvConfig};
use crate::gemini::{ClientFactory, GeminiClientFactory};

pub struct AppState {
    // The single active dashboard session, if logged in
    pub session: Option<Arc<ChatSession>>,
    pub config: AppConfig,
    credentials: Arc<dyn ConfigProvider>,
    factory: Arc<dyn ClientFactory>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let factory = Arc::new(GeminiClientFactory::new(&config.gemini_api_hostname));
        Self::with_providers(config, Arc::new(EnvConfig), factory)
    }

    pub fn with_providers(
        config: AppConfig,
        credentials: Arc<dyn ConfigProvider>,
        factory: Arc<dyn ClientFactory>,
    ) -> Self {
        Self {
            session: None,
            config,
            credentials,
            factory,
        }
    }

    /// Replace any active session with a fresh one and return it.
    pub fn start_session(&mut self) -> Arc<ChatSession> {
        let session = Arc::new(
            ChatSession::builder()
                .model(&self.config.gemini_model)
                .system_instruction(&self.config.system_instruction)
                .config(Arc::clone(&self.credentials))
                .factory(Arc::clone(&self.factory))
                .build(),
        );
        self.session = Some(Arc::clone(&session));
        session
    }

    /// Drop the active session. Nothing is persisted.
    pub fn end_session(&mut self) -> Option<Arc<ChatSession>> {
        self.session.take()
    }
}
