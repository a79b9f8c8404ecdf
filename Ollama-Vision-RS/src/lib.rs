//! # ollama-vision
//!
//! Minimal Ollama vision client: send one image and one prompt to a vision
//! model, get one answer back.
//!
//! ## Features
//!
//! - **Single-call contract**: `(model, prompt, image bytes) -> text`
//! - **Typed failures**: transport errors, non-2xx statuses and malformed
//!   bodies all surface as [`VisionError`]; any text the model produces is a
//!   success
//! - **Pluggable backend**: the [`VisionBackend`] trait lets callers swap the
//!   HTTP client for a scripted one in tests
//! - **Response cleanup**: `<think>` blocks from reasoning models are stripped
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ollama_vision::{OllamaClient, OllamaVisionConfig, VisionBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OllamaClient::new(OllamaVisionConfig::default());
//!     let image = std::fs::read("photo.jpg")?;
//!
//!     let caption = client
//!         .invoke("llava:7b", "Describe this image clearly.", &image)
//!         .await?;
//!     println!("Caption: {}", caption);
//!
//!     let tags = ollama_vision::split_tags(
//!         &client
//!             .invoke("llava:7b", "Generate 5 short keyword tags separated by commas.", &image)
//!             .await?,
//!     );
//!     println!("Tags: {:?}", tags);
//!     Ok(())
//! }
//! ```
//!
//! ## Tag splitting
//!
//! ```rust
//! use ollama_vision::split_tags;
//!
//! assert_eq!(split_tags("cat, dog,  bird"), vec!["cat", "dog", "bird"]);
//! assert_eq!(split_tags("cat,, dog"), vec!["cat", "dog"]);
//! ```

pub mod client;
pub mod error;
pub mod parser;
pub mod types;

// Re-export main types at crate root
pub use client::{OllamaClient, VisionBackend};
pub use error::VisionError;
pub use parser::{clean_response, split_tags, strip_think_tags};
pub use types::{GenerateOptions, OllamaVisionConfig};
