use std::sync::Arc;

use crate::core::ConfigProvider;

/// Keys checked for the API credential, in priority order.
pub const CREDENTIAL_KEYS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Locates the API credential. Reads the configuration on every call,
/// caching is left to the caller.
#[derive(Clone)]
pub struct CredentialResolver {
    config: Arc<dyn ConfigProvider>,
}

impl CredentialResolver {
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self { config }
    }

    /// First non-empty credential, `None` if there is none.
    pub fn resolve(&self) -> Option<String> {
        CREDENTIAL_KEYS
            .iter()
            .filter_map(|key| self.config.get(key))
            .find(|value| !value.is_empty())
    }
}
