use crate::error::{Result, StudioError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Filesystem area holding uploaded image bytes.
///
/// Records only keep the reference string returned by [`ImageStore::save`];
/// the bytes themselves live here.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a name derived from `created_at` and the
    /// client-supplied `filename_hint`. Returns the reference.
    pub fn save(&self, filename_hint: &str, bytes: &[u8], created_at: DateTime<Utc>) -> Result<String> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            StudioError::StorageWrite(format!("{}: {}", self.root.display(), e))
        })?;

        let name = stored_file_name(filename_hint, created_at);
        let path = self.root.join(name);
        std::fs::write(&path, bytes)
            .map_err(|e| StudioError::StorageWrite(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Stored uploaded image");
        Ok(path.to_string_lossy().into_owned())
    }

    /// Read the bytes behind `reference`.
    pub fn read(&self, reference: &str) -> Result<Vec<u8>> {
        std::fs::read(reference)
            .map_err(|e| StudioError::StorageRead(format!("{}: {}", reference, e)))
    }

    /// Best-effort read for exporters: a missing image degrades the export
    /// instead of failing it.
    pub fn read_optional(&self, reference: &str) -> Option<Vec<u8>> {
        match self.read(reference) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Image unavailable");
                None
            }
        }
    }

    /// Delete the bytes behind `reference`, logging instead of failing.
    pub fn remove_best_effort(&self, reference: &str) {
        if let Err(e) = std::fs::remove_file(reference) {
            warn!(reference, error = %e, "Failed to remove stored image");
        }
    }
}

/// `{YYYYmmdd_HHMMSS}_{8 hex}_{name}`. The random segment keeps two uploads of
/// the same file within one second apart; `name` is reduced to its final
/// path component with unsafe characters replaced.
fn stored_file_name(filename_hint: &str, created_at: DateTime<Utc>) -> String {
    let base = filename_hint
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let mut safe: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    safe = safe.trim_start_matches('.').to_string();
    if safe.is_empty() {
        safe = "upload.jpg".to_string();
    }

    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        created_at.format("%Y%m%d_%H%M%S"),
        &nonce[..8],
        safe
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_file_name_has_timestamp_and_original_name() {
        let name = stored_file_name("sofa.jpg", at());
        assert!(name.starts_with("20240309_140507_"));
        assert!(name.ends_with("_sofa.jpg"));
    }

    #[test]
    fn test_file_name_drops_directories() {
        let name = stored_file_name("../../etc/passwd", at());
        assert!(name.ends_with("_passwd"));
        assert!(!name.contains('/'));

        let name = stored_file_name("C:\\Users\\me\\cat photo.png", at());
        assert!(name.ends_with("_cat_photo.png"));
    }

    #[test]
    fn test_file_name_for_empty_hint() {
        assert!(stored_file_name("", at()).ends_with("_upload.jpg"));
        assert!(stored_file_name("..", at()).ends_with("_upload.jpg"));
    }

    #[test]
    fn test_save_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("uploads"));

        let reference = store.save("a.jpg", b"\xFF\xD8bytes", at()).unwrap();
        assert_eq!(store.read(&reference).unwrap(), b"\xFF\xD8bytes");

        store.remove_best_effort(&reference);
        assert!(store.read(&reference).is_err());
        assert!(store.read_optional(&reference).is_none());

        // Removing again only logs.
        store.remove_best_effort(&reference);
    }

    #[test]
    fn test_same_name_same_second_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let a = store.save("a.jpg", b"one", at()).unwrap();
        let b = store.save("a.jpg", b"two", at()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.read(&a).unwrap(), b"one");
    }
}
