/// Errors that can occur while calling the vision backend.
///
/// Only transport and protocol failures are errors. Whatever text the model
/// produces, including an empty string, is a successful answer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VisionError {
    #[error("Cannot connect to Ollama at {0}: {1}")]
    Connection(String, String),

    #[error("Ollama returned HTTP {0}: {1}")]
    Http(u16, String),

    #[error("Invalid response from Ollama: {0}")]
    InvalidResponse(String),
}

impl VisionError {
    /// Short machine-friendly name of the failure kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            VisionError::Connection(..) => "connection",
            VisionError::Http(..) => "http",
            VisionError::InvalidResponse(_) => "invalid_response",
        }
    }
}
