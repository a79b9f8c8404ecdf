use thiserror::Error;

/// Errors that can occur in the caption studio.
///
/// Vision failures never show up here during capture: they are recovered
/// into placeholder text. They only surface directly where a caller asked a
/// single question and nothing partial can be kept.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record {0} belongs to another owner")]
    Forbidden(String),

    #[error("Failed to write to storage: {0}")]
    StorageWrite(String),

    #[error("Failed to read from storage: {0}")]
    StorageRead(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Vision backend error: {0}")]
    Vision(#[from] ollama_vision::VisionError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Report rendering failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for StudioError {
    fn from(err: anyhow::Error) -> Self {
        StudioError::Other(format!("{:#}", err))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StudioError>;
