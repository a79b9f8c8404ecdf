use crate::prompts;
use crate::types::{text_or_placeholder, CopyType, Language, MarketingCopy};
use futures::future::join_all;
use ollama_vision::VisionBackend;
use std::sync::Arc;
use tracing::debug;

/// Generates the five marketing texts for one image in one language.
///
/// Every call is independent: a failed slot holds the placeholder text and
/// the other slots are unaffected. Nothing is cached.
#[derive(Clone)]
pub struct MarketingGenerator {
    backend: Arc<dyn VisionBackend>,
    model: String,
}

impl MarketingGenerator {
    pub fn new(backend: Arc<dyn VisionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run all five templates for `language`. The five calls run concurrently.
    pub async fn generate(&self, image: &[u8], language: Language) -> MarketingCopy {
        debug!(language = %language, model = %self.model, "Generating marketing copy");

        let calls = CopyType::ALL.iter().map(|&copy_type| async move {
            let prompt = prompts::marketing_prompt(copy_type, language);
            let result = self.backend.invoke(&self.model, &prompt, image).await;
            let slot = format!("marketing.{}.{}", language.code(), copy_type);
            (copy_type, text_or_placeholder(result, &slot))
        });

        join_all(calls).await.into_iter().collect()
    }
}
