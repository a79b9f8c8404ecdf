use crate::{
    bundle,
    capture::CapturePipeline,
    config::StudioConfig,
    error::{Result, StudioError},
    followup::FollowUp,
    images::ImageStore,
    report::ReportRenderer,
    store::RecordStore,
    types::ResultRecord,
};
use ollama_vision::{OllamaClient, VisionBackend};
use std::sync::Arc;
use tracing::info;

/// Entry point tying the components together from one [`StudioConfig`].
///
/// Every method taking an `owner` checks it against the record before
/// doing anything. `None` is the single-user owner and only matches records
/// without an owner.
#[derive(Clone)]
pub struct CaptionStudio {
    config: StudioConfig,
    images: ImageStore,
    store: RecordStore,
    pipeline: CapturePipeline,
    followup: FollowUp,
    renderer: ReportRenderer,
}

impl CaptionStudio {
    /// Build a studio that talks to the Ollama endpoint from `config`.
    pub fn new(config: StudioConfig) -> Result<Self> {
        let client = OllamaClient::new(config.vision.client_config());
        Self::with_backend(config, Arc::new(client))
    }

    /// Build a studio around any vision backend.
    pub fn with_backend(config: StudioConfig, backend: Arc<dyn VisionBackend>) -> Result<Self> {
        let images = ImageStore::new(config.storage.upload_dir.clone());
        let store = RecordStore::open(config.storage.database_path.as_deref(), images.clone())?;
        let pipeline = CapturePipeline::new(
            Arc::clone(&backend),
            config.vision.clone(),
            images.clone(),
            store.clone(),
        );
        let followup = FollowUp::new(backend, config.vision.primary_model.clone(), images.clone());
        let renderer = ReportRenderer::new(config.report.clone());

        info!(
            endpoint = %config.vision.endpoint,
            uploads = %config.storage.upload_dir.display(),
            database = ?config.storage.database_path,
            "Caption studio ready"
        );

        Ok(Self {
            config,
            images,
            store,
            pipeline,
            followup,
            renderer,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Caption a new image and store the result under `owner`.
    pub async fn capture(&self, image: &[u8], filename: &str, owner: Option<&str>) -> Result<ResultRecord> {
        if image.is_empty() {
            return Err(StudioError::InvalidInput("image is empty".to_string()));
        }
        self.pipeline.capture(image, filename, owner).await
    }

    /// Records of `owner`, newest first.
    pub fn history(&self, owner: Option<&str>) -> Result<Vec<ResultRecord>> {
        self.store.list_by_owner(owner)
    }

    pub fn record(&self, id: &str, owner: Option<&str>) -> Result<ResultRecord> {
        let record = self.store.get(id)?;
        if !record.is_owned_by(owner) {
            return Err(StudioError::Forbidden(id.to_string()));
        }
        Ok(record)
    }

    pub fn delete(&self, id: &str, owner: Option<&str>) -> Result<()> {
        self.store.delete(id, owner)
    }

    /// PDF report of record `id`.
    pub fn report(&self, id: &str, owner: Option<&str>) -> Result<Vec<u8>> {
        let record = self.record(id, owner)?;
        let image = self.images.read_optional(&record.image_reference);
        self.renderer.render(&record, image.as_deref())
    }

    /// ZIP bundle of record `id`.
    pub fn bundle(&self, id: &str, owner: Option<&str>) -> Result<Vec<u8>> {
        let record = self.record(id, owner)?;
        let image = self.images.read_optional(&record.image_reference);
        bundle::export(&record, image.as_deref())
    }

    /// Ask a question about the image of record `id`. The answer is not stored.
    pub async fn ask(&self, id: &str, owner: Option<&str>, question: &str) -> Result<String> {
        let record = self.record(id, owner)?;
        self.followup.ask(&record.image_reference, question).await
    }
}
