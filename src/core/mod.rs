mod config;
pub mod logging;

pub use config::{
    AppConfig, ConfigProvider, DEFAULT_GEMINI_HOST, DEFAULT_GEMINI_MODEL, EnvConfig, StaticConfig,
};
