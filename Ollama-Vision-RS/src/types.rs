use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout. Vision models on consumer hardware are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Default Ollama endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434";

/// Configuration for the Ollama vision client.
#[derive(Debug, Clone)]
pub struct OllamaVisionConfig {
    /// Ollama API endpoint (e.g., "http://localhost:11434")
    pub endpoint: String,
    /// Per-request timeout (default: 180s)
    pub timeout: Duration,
    /// Generation options sent to Ollama. `None` leaves the model defaults.
    pub options: Option<GenerateOptions>,
}

/// Ollama generation options controlling output quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Maximum tokens to generate
    pub num_predict: u32,
    /// Penalize repeated tokens (default: 1.2)
    pub repeat_penalty: f32,
    /// Window for repeat penalty (default: 128)
    pub repeat_last_n: u32,
    /// Temperature (default: None, uses Ollama default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p sampling (default: None, uses Ollama default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_predict: 512,
            repeat_penalty: 1.2,
            repeat_last_n: 128,
            temperature: None,
            top_p: None,
        }
    }
}

impl Default for OllamaVisionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            options: None,
        }
    }
}

impl OllamaVisionConfig {
    /// Set the Ollama endpoint. A trailing slash is dropped.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the generation options.
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Full URL of the generate endpoint.
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_three_minutes() {
        let config = OllamaVisionConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(180));
        assert!(config.options.is_none());
    }

    #[test]
    fn endpoint_trailing_slash_is_dropped() {
        let config = OllamaVisionConfig::default().endpoint("http://gpu-box:11434/");
        assert_eq!(config.generate_url(), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn options_skip_unset_sampling_fields() {
        let value = serde_json::to_value(GenerateOptions::default()).unwrap();
        assert_eq!(value["num_predict"], 512);
        assert!(value.get("temperature").is_none());
        assert!(value.get("top_p").is_none());
    }
}
