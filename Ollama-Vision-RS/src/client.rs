use crate::error::VisionError;
use crate::parser;
use crate::types::OllamaVisionConfig;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

/// Anything that can answer a prompt about an image.
///
/// [`OllamaClient`] is the production implementation. Callers hold an
/// `Arc<dyn VisionBackend>` so tests can substitute scripted backends.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Ask `model` the given `prompt` about `image`.
    ///
    /// Returns the model's cleaned text answer. Any text is a success; only
    /// transport, status and body-shape problems are errors.
    async fn invoke(&self, model: &str, prompt: &str, image: &[u8]) -> Result<String, VisionError>;
}

/// HTTP client for Ollama's `/api/generate` endpoint.
///
/// # Example
/// ```no_run
/// use ollama_vision::{OllamaClient, OllamaVisionConfig, VisionBackend};
///
/// # async fn example(image: &[u8]) -> Result<(), ollama_vision::VisionError> {
/// let client = OllamaClient::new(OllamaVisionConfig::default());
/// let answer = client.invoke("llava:7b", "What is in this picture?", image).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    config: OllamaVisionConfig,
}

impl OllamaClient {
    /// Create a client with its own connection pool.
    pub fn new(config: OllamaVisionConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &OllamaVisionConfig {
        &self.config
    }
}

#[async_trait]
impl VisionBackend for OllamaClient {
    async fn invoke(&self, model: &str, prompt: &str, image: &[u8]) -> Result<String, VisionError> {
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image);

        let mut body = json!({
            "model": model,
            "prompt": prompt,
            "images": [image_b64],
            "stream": false,
        });

        if let Some(options) = &self.config.options {
            body["options"] = json!(options);
        }

        let url = self.config.generate_url();
        debug!(model, url = %url, image_bytes = image.len(), "Sending vision request");

        let resp = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(model, error = %e, "Vision request failed");
                VisionError::Connection(self.config.endpoint.clone(), e.to_string())
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            warn!(model, status, "Vision backend returned an error status");
            return Err(VisionError::Http(status, text));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| VisionError::InvalidResponse(e.to_string()))?;

        let raw = json
            .get("response")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                VisionError::InvalidResponse("missing string field `response`".to_string())
            })?;

        Ok(parser::clean_response(raw))
    }
}
