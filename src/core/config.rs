use std::collections::HashMap;
use std::env;

use crate::ai::replies::DEFAULT_SYSTEM_INSTRUCTION;

pub const DEFAULT_GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gemini_api_hostname: String,
    pub gemini_model: String,
    pub system_instruction: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let gemini_api_hostname =
            env::var("MRT_GEMINI_HOST").unwrap_or_else(|_| DEFAULT_GEMINI_HOST.to_string());
        let gemini_model =
            env::var("MRT_GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let system_instruction = env::var("MRT_SYSTEM_INSTRUCTION")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_INSTRUCTION.to_string());

        Self {
            gemini_api_hostname,
            gemini_model,
            system_instruction,
        }
    }
}

/// Source of process-wide string settings such as API credentials.
///
/// Injected wherever configuration is read lazily so tests can swap in
/// fixed values without touching the real environment.
pub trait ConfigProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Clone, Debug, Default)]
pub struct EnvConfig;

impl ConfigProvider for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// A fixed set of values.
#[derive(Clone, Debug, Default)]
pub struct StaticConfig(HashMap<String, String>);

impl StaticConfig {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl ConfigProvider for StaticConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}
