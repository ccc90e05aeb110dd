//! Runtime configuration for a generation run and the HTTP surface.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::domain::llm_config::LLMConfig;
use crate::domain::test_case::GenerationMode;

/// Fan-out and timeout policy for the remote strategy
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct RemoteOptions {
    /// Maximum in-flight generation requests
    #[validate(range(min = 1, max = 32))]
    pub max_concurrency: usize,

    /// Per-request timeout, in seconds
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
}

impl RemoteOptions {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Strategy used when a caller does not pick one
    pub mode: GenerationMode,
    pub llm: LLMConfig,
    #[validate(nested)]
    pub remote: RemoteOptions,
    pub http: HttpConfig,
    /// Fall back to the OS keyring when no API key is configured
    pub use_keyring: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::default(),
            llm: LLMConfig::default(),
            remote: RemoteOptions::default(),
            http: HttpConfig::default(),
            use_keyring: true,
        }
    }
}
