use crate::{
    error::{Result, StudioError},
    images::ImageStore,
    prompts,
    types::text_or_placeholder,
};
use ollama_vision::VisionBackend;
use std::sync::Arc;
use tracing::debug;

/// Answers free-text questions about an already captured image.
///
/// Answers are returned, never stored.
#[derive(Clone)]
pub struct FollowUp {
    backend: Arc<dyn VisionBackend>,
    model: String,
    images: ImageStore,
}

impl FollowUp {
    pub fn new(backend: Arc<dyn VisionBackend>, model: impl Into<String>, images: ImageStore) -> Self {
        Self {
            backend,
            model: model.into(),
            images,
        }
    }

    /// Ask `question` about the image behind `image_reference`.
    ///
    /// A vision failure yields the placeholder text; an unreadable image or
    /// a blank question is an error.
    pub async fn ask(&self, image_reference: &str, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(StudioError::InvalidInput("question must not be empty".to_string()));
        }

        let image = {
            let images = self.images.clone();
            let reference = image_reference.to_string();
            tokio::task::spawn_blocking(move || images.read(&reference)).await??
        };
        let prompt = prompts::question_prompt(question);
        debug!(image = %image_reference, model = %self.model, "Asking follow-up question");

        let result = self.backend.invoke(&self.model, &prompt, &image).await;
        Ok(text_or_placeholder(result, "followup"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use ollama_vision::VisionError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl VisionBackend for RecordingBackend {
        async fn invoke(
            &self,
            model: &str,
            prompt: &str,
            image: &[u8],
        ) -> std::result::Result<String, VisionError> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            Ok(format!("{} bytes seen", image.len()))
        }
    }

    #[tokio::test]
    async fn test_ask_composes_prompt_for_primary_model() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageStore::new(dir.path());
        let reference = images.save("a.jpg", b"12345", Utc::now()).unwrap();
        let backend = Arc::new(RecordingBackend::default());
        let followup = FollowUp::new(backend.clone(), "llava:7b", images);

        let answer = followup.ask(&reference, "Is it red?").await.unwrap();
        assert_eq!(answer, "5 bytes seen");

        let calls = backend.prompts.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "llava:7b");
        assert_eq!(calls[0].1, "Answer this question based on the image: Is it red?");
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let followup = FollowUp::new(
            Arc::new(RecordingBackend::default()),
            "llava:7b",
            ImageStore::new(dir.path()),
        );
        let result = followup.ask("whatever.jpg", "   ").await;
        assert!(matches!(result, Err(StudioError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_missing_image_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let followup = FollowUp::new(
            Arc::new(RecordingBackend::default()),
            "llava:7b",
            ImageStore::new(dir.path()),
        );
        let missing = dir.path().join("missing.jpg");
        let result = followup.ask(&missing.to_string_lossy(), "Why?").await;
        assert!(matches!(result, Err(StudioError::StorageRead(_))));
    }
}
