use config::{Config, ConfigError, Environment, File};
use ollama_vision::OllamaVisionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, passed explicitly to every component.
///
/// Every field has a default, so an empty environment yields a working
/// single-user setup talking to a local Ollama.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Vision backend endpoint and the model used for each job.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Ollama base URL.
    pub endpoint: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Model for the primary caption, tags and follow-up questions.
    pub primary_model: String,
    /// Model for the second, independent caption.
    pub secondary_model: String,
    /// Model for all marketing copy.
    pub marketing_model: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: ollama_vision::types::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: ollama_vision::types::DEFAULT_TIMEOUT.as_secs(),
            primary_model: "llava:7b".to_string(),
            secondary_model: "bakllava:7b".to_string(),
            marketing_model: "llava:7b".to_string(),
        }
    }
}

impl VisionConfig {
    /// Client configuration for [`ollama_vision::OllamaClient`].
    pub fn client_config(&self) -> OllamaVisionConfig {
        OllamaVisionConfig::default()
            .endpoint(self.endpoint.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Where image bytes and records live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory receiving uploaded images.
    pub upload_dir: PathBuf,
    /// SQLite database file. `None` = in-memory database.
    pub database_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/uploads"),
            database_path: Some(PathBuf::from("caption_studio.db")),
        }
    }
}

/// PDF report geometry. Lengths are millimetres, font sizes points.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// Vertical distance between consecutive text lines.
    pub line_height_mm: f32,
    pub font_size: f32,
    pub title_font_size: f32,
    /// Rendered image width; height follows the aspect ratio.
    pub image_width_mm: f32,
    /// Lines longer than this many characters are wrapped.
    pub wrap_columns: usize,
    /// TrueType font to embed instead of Helvetica (needed for CJK text).
    pub font_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            line_height_mm: 6.0,
            font_size: 11.0,
            title_font_size: 16.0,
            image_width_mm: 80.0,
            wrap_columns: 95,
            font_path: None,
        }
    }
}

impl StudioConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with CAPTION_STUDIO__ prefix
    /// 2. The given file, or `caption-studio.toml` in the current directory
    /// 3. Default values
    ///
    /// Environment variable format: CAPTION_STUDIO__VISION__ENDPOINT
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Keep everything in memory (database) and under `dir` (images).
    pub fn ephemeral(dir: impl Into<PathBuf>) -> Self {
        Self::default()
            .with_upload_dir(dir)
            .with_database_path(None)
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage.upload_dir = dir.into();
        self
    }

    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        self.storage.database_path = path;
        self
    }

    pub fn with_vision_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.vision.endpoint = endpoint.into();
        self
    }
}

/// See [`StudioConfig::load`].
pub fn load_config(path: Option<&Path>) -> Result<StudioConfig, ConfigError> {
    let file = match path {
        Some(p) => File::from(p).required(true),
        None => File::with_name("caption-studio").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: CAPTION_STUDIO__STORAGE__UPLOAD_DIR
        .add_source(
            Environment::with_prefix("CAPTION_STUDIO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
