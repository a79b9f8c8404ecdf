use crate::{
    config::VisionConfig,
    db,
    error::Result,
    images::ImageStore,
    marketing::MarketingGenerator,
    prompts,
    store::RecordStore,
    types::{text_or_placeholder, Language, RecordDraft, ResultRecord},
};
use ollama_vision::{split_tags, VisionBackend};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Turns one uploaded image into a stored [`ResultRecord`].
///
/// Steps: store the image, caption it with two models, extract tags, then
/// generate marketing copy for every [`Language`]. A failed vision call only
/// blanks its own field with the placeholder text; the only fatal failures
/// are writing the image and writing the record.
#[derive(Clone)]
pub struct CapturePipeline {
    backend: Arc<dyn VisionBackend>,
    models: VisionConfig,
    marketing: MarketingGenerator,
    images: ImageStore,
    store: RecordStore,
}

impl CapturePipeline {
    pub fn new(
        backend: Arc<dyn VisionBackend>,
        models: VisionConfig,
        images: ImageStore,
        store: RecordStore,
    ) -> Self {
        let marketing = MarketingGenerator::new(Arc::clone(&backend), models.marketing_model.clone());
        Self {
            backend,
            models,
            marketing,
            images,
            store,
        }
    }

    pub async fn capture(
        &self,
        image: &[u8],
        filename_hint: &str,
        owner_id: Option<&str>,
    ) -> Result<ResultRecord> {
        let created_at = db::timestamp_now();
        let image_reference = {
            let images = self.images.clone();
            let bytes = image.to_vec();
            let hint = filename_hint.to_string();
            tokio::task::spawn_blocking(move || images.save(&hint, &bytes, created_at)).await??
        };
        info!(image = %image_reference, owner = ?owner_id, "Capture started");

        let (caption_primary, caption_secondary) = tokio::join!(
            self.caption(&self.models.primary_model, image),
            self.caption(&self.models.secondary_model, image),
        );

        let tags = split_tags(&text_or_placeholder(
            self.backend
                .invoke(&self.models.primary_model, prompts::TAG_PROMPT, image)
                .await,
            "tags",
        ));

        let mut marketing = BTreeMap::new();
        for language in Language::ALL {
            marketing.insert(language, self.marketing.generate(image, language).await);
        }

        let draft = RecordDraft {
            owner_id: owner_id.map(str::to_string),
            image_reference,
            caption_primary,
            caption_secondary,
            tags,
            marketing,
            created_at,
        };

        let id = {
            let store = self.store.clone();
            let draft = draft.clone();
            tokio::task::spawn_blocking(move || store.create(&draft)).await??
        };
        info!(record_id = %id, tags = draft.tags.len(), "Capture finished");
        Ok(draft.into_record(id))
    }

    async fn caption(&self, model: &str, image: &[u8]) -> String {
        let result = self.backend.invoke(model, prompts::CAPTION_PROMPT, image).await;
        text_or_placeholder(result, &format!("caption.{}", model))
    }
}
