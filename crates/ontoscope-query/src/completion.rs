//! Text-completion service interface

use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Temperature used for query classification
pub const CLASSIFY_TEMPERATURE: f32 = 0.3;

/// Temperature used for free-form explanations
pub const EXPLAIN_TEMPERATURE: f32 = 0.7;

/// Default endpoint of an OpenAI-compatible service
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API key that disables the Authorization header (local gateways)
pub const DEMO_API_KEY: &str = "demo";

/// One prompt sent to the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: CLASSIFY_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Prompt in, text out.
///
/// Implementations never retry; a failed call is reported once.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Connection settings for an OpenAI-compatible service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CompletionSettings {
    /// A service is usable once an API key is set
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn sends_auth_header(&self) -> bool {
        self.api_key.trim() != DEMO_API_KEY
    }

    /// `<base_url>/chat/completions` with any trailing slash removed
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim();
        let base = if base.is_empty() { DEFAULT_BASE_URL } else { base };
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    pub fn model_or_default(&self) -> &str {
        if self.model.trim().is_empty() {
            DEFAULT_MODEL
        } else {
            self.model.trim()
        }
    }
}
