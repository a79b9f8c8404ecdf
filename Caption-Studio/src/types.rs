use chrono::{DateTime, Utc};
use ollama_vision::VisionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Text written into a field whose vision call failed.
pub const VISION_ERROR_PLACEHOLDER: &str = "(Error calling model)";

/// Marketing text categories, one prompt template each.
///
/// Declaration order is the order used in maps, reports and bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyType {
    Ecommerce,
    Xiaohongshu,
    Instagram,
    Seo,
    Bullets,
}

impl CopyType {
    pub const ALL: [CopyType; 5] = [
        CopyType::Ecommerce,
        CopyType::Xiaohongshu,
        CopyType::Instagram,
        CopyType::Seo,
        CopyType::Bullets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CopyType::Ecommerce => "ecommerce",
            CopyType::Xiaohongshu => "xiaohongshu",
            CopyType::Instagram => "instagram",
            CopyType::Seo => "seo",
            CopyType::Bullets => "bullets",
        }
    }
}

impl fmt::Display for CopyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Languages marketing copy is generated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Chinese,
    French,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Chinese, Language::French];

    /// Name substituted into prompts and shown in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "Chinese",
            Language::French => "French",
        }
    }

    /// Short code used in file and column names.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "cn",
            Language::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated copy for one language, keyed by copy type.
pub type MarketingCopy = BTreeMap<CopyType, String>;

/// Everything generated for one uploaded image.
///
/// Immutable once stored; the only lifecycle transition is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub owner_id: Option<String>,
    /// Locator of the stored image bytes (a path inside the upload dir).
    pub image_reference: String,
    pub caption_primary: String,
    pub caption_secondary: String,
    pub tags: Vec<String>,
    pub marketing: BTreeMap<Language, MarketingCopy>,
    pub created_at: DateTime<Utc>,
}

impl ResultRecord {
    /// Copy for `language`, empty if missing.
    pub fn marketing_for(&self, language: Language) -> MarketingCopy {
        self.marketing.get(&language).cloned().unwrap_or_default()
    }

    pub fn is_owned_by(&self, owner_id: Option<&str>) -> bool {
        self.owner_id.as_deref() == owner_id
    }
}

/// A record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub owner_id: Option<String>,
    pub image_reference: String,
    pub caption_primary: String,
    pub caption_secondary: String,
    pub tags: Vec<String>,
    pub marketing: BTreeMap<Language, MarketingCopy>,
    pub created_at: DateTime<Utc>,
}

impl RecordDraft {
    pub fn into_record(self, id: impl Into<String>) -> ResultRecord {
        ResultRecord {
            id: id.into(),
            owner_id: self.owner_id,
            image_reference: self.image_reference,
            caption_primary: self.caption_primary,
            caption_secondary: self.caption_secondary,
            tags: self.tags,
            marketing: self.marketing,
            created_at: self.created_at,
        }
    }
}

/// Turn a vision result into field text, logging the failure.
pub fn text_or_placeholder(result: Result<String, VisionError>, slot: &str) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(slot, kind = e.kind(), error = %e, "Vision call failed, using placeholder");
            VISION_ERROR_PLACEHOLDER.to_string()
        }
    }
}
