//! Generative model endpoint settings.

use serde::{Deserialize, Serialize};

/// Connection and sampling parameters for the chat-completions endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Base URL; requests go to `{endpoint}/chat/completions`.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model_id: String,
    /// Environment variable holding the bearer key. Unset or empty sends no key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Replacement for the built-in system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/v1".to_string(),
            model_id: "cohere.command-r-plus-08-2024".to_string(),
            api_key_env: "FTP_MODEL_API_KEY".to_string(),
            temperature: 0.0,
            max_tokens: 800,
            timeout_ms: 60_000,
            system_prompt: None,
        }
    }
}
