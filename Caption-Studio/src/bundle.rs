use crate::error::Result;
use crate::types::{Language, ResultRecord};
use serde_json::json;
use std::io::{Cursor, Write};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const IMAGE_ENTRY: &str = "image.jpg";
pub const CAPTIONS_ENTRY: &str = "captions.txt";
pub const TAGS_ENTRY: &str = "tags.txt";
pub const METADATA_ENTRY: &str = "metadata.json";

/// Entry name of the marketing payload for `language`.
pub fn marketing_entry(language: Language) -> String {
    format!("marketing_{}.json", language.code())
}

/// Text of `captions.txt`.
pub fn captions_text(record: &ResultRecord) -> String {
    format!(
        "Primary caption:\n{}\n\nSecondary caption:\n{}\n",
        record.caption_primary, record.caption_secondary
    )
}

/// Package `record` as a ZIP archive.
///
/// `image` is the stored image; when it is `None` the `image.jpg` entry is
/// left out and every other entry is still written.
pub fn export(record: &ResultRecord, image: Option<&[u8]>) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut add = |name: &str, data: &[u8]| -> Result<()> {
        zip.start_file(name, options)?;
        zip.write_all(data).map_err(ZipError::from)?;
        Ok(())
    };

    match image {
        Some(bytes) => add(IMAGE_ENTRY, bytes)?,
        None => warn!(record_id = %record.id, "Bundle exported without image"),
    }

    add(CAPTIONS_ENTRY, captions_text(record).as_bytes())?;
    add(TAGS_ENTRY, record.tags.join(", ").as_bytes())?;

    for language in Language::ALL {
        let payload = serde_json::to_string_pretty(&record.marketing_for(language))?;
        add(&marketing_entry(language), payload.as_bytes())?;
    }

    let metadata = json!({
        "id": record.id,
        "created_at": record.created_at.to_rfc3339(),
        "image": record.image_reference,
        "tags": record.tags,
    });
    add(METADATA_ENTRY, serde_json::to_string_pretty(&metadata)?.as_bytes())?;

    let bytes = zip.finish()?.into_inner();
    debug!(record_id = %record.id, bytes = bytes.len(), "Exported bundle");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CopyType, MarketingCopy};
    use chrono::{TimeZone, Utc};
    use std::io::Read;
    use zip::ZipArchive;

    fn record() -> ResultRecord {
        let mut marketing = std::collections::BTreeMap::new();
        for language in Language::ALL {
            let copy: MarketingCopy = CopyType::ALL
                .iter()
                .map(|t| (*t, format!("{} {}", language.code(), t)))
                .collect();
            marketing.insert(language, copy);
        }
        ResultRecord {
            id: "rec-1".into(),
            owner_id: Some("alice".into()),
            image_reference: "static/uploads/20240101_120000_deadbeef_cat.jpg".into(),
            caption_primary: "A cat on a sofa".into(),
            caption_secondary: "A sofa with a cat".into(),
            tags: vec!["cat".into(), "sofa".into(), "pet".into()],
            marketing,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn entry(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    fn names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_entry_names() {
        let bytes = export(&record(), Some(b"jpeg bytes")).unwrap();
        assert_eq!(
            names(&bytes),
            vec![
                "captions.txt",
                "image.jpg",
                "marketing_cn.json",
                "marketing_en.json",
                "marketing_fr.json",
                "metadata.json",
                "tags.txt",
            ]
        );
    }

    #[test]
    fn test_text_entries() {
        let bytes = export(&record(), Some(b"jpeg bytes")).unwrap();
        assert_eq!(
            entry(&bytes, CAPTIONS_ENTRY),
            "Primary caption:\nA cat on a sofa\n\nSecondary caption:\nA sofa with a cat\n"
        );
        assert_eq!(entry(&bytes, TAGS_ENTRY), "cat, sofa, pet");
    }

    #[test]
    fn test_marketing_payload_is_indented_and_parses_back() {
        let rec = record();
        let bytes = export(&rec, None).unwrap();
        let text = entry(&bytes, "marketing_en.json");
        assert!(text.contains("\n  \"ecommerce\""));

        let parsed: MarketingCopy = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, rec.marketing[&Language::English]);
    }

    #[test]
    fn test_metadata_fields() {
        let rec = record();
        let bytes = export(&rec, None).unwrap();
        let metadata: serde_json::Value = serde_json::from_str(&entry(&bytes, METADATA_ENTRY)).unwrap();

        assert_eq!(metadata["id"], "rec-1");
        assert_eq!(metadata["created_at"], "2024-01-01T12:00:00+00:00");
        assert_eq!(metadata["image"], rec.image_reference.as_str());
        assert_eq!(metadata["tags"], json!(["cat", "sofa", "pet"]));
    }

    #[test]
    fn test_missing_image_omits_entry_only() {
        let bytes = export(&record(), None).unwrap();
        let names = names(&bytes);
        assert!(!names.contains(&IMAGE_ENTRY.to_string()));
        assert_eq!(names.len(), 6);
    }
}
