//! # Caption Studio
//!
//! Upload an image, get two captions, a tag list and marketing copy in five
//! styles and three languages, all produced by Ollama vision models. Results
//! are stored per owner and can be exported as a PDF report or a ZIP bundle,
//! or queried further with follow-up questions.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use caption_studio::{CaptionStudio, StudioConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let studio = CaptionStudio::new(StudioConfig::load(None)?)?;
//!
//!     let image = std::fs::read("photo.jpg")?;
//!     let record = studio.capture(&image, "photo.jpg", None).await?;
//!     println!("{} -> {:?}", record.caption_primary, record.tags);
//!
//!     std::fs::write("report.pdf", studio.report(&record.id, None)?)?;
//!     Ok(())
//! }
//! ```
//!
//! A vision call that fails never aborts a capture: the affected field gets
//! [`VISION_ERROR_PLACEHOLDER`] and the record is stored anyway.

pub mod bundle;
pub mod capture;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod followup;
pub mod images;
pub mod marketing;
pub mod prompts;
pub mod report;
pub mod server;
pub mod store;
pub mod studio;
pub mod types;

pub use capture::CapturePipeline;
pub use config::{ReportConfig, StorageConfig, StudioConfig, VisionConfig};
pub use error::{Result, StudioError};
pub use followup::FollowUp;
pub use images::ImageStore;
pub use marketing::MarketingGenerator;
pub use report::ReportRenderer;
pub use store::RecordStore;
pub use studio::CaptionStudio;
pub use types::{CopyType, Language, MarketingCopy, ResultRecord, VISION_ERROR_PLACEHOLDER};
