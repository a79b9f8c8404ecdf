use crate::{
    db,
    error::{Result, StudioError},
    images::ImageStore,
    types::{RecordDraft, ResultRecord},
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Persists result records, scoped by owner.
///
/// Records are immutable: there is create, read and delete, but no update.
/// Deleting a record also removes its image from the [`ImageStore`] on a
/// best-effort basis.
#[derive(Clone)]
pub struct RecordStore {
    db: Arc<Mutex<Connection>>,
    images: ImageStore,
}

impl RecordStore {
    /// Open (or create) the database at `db_path`; `None` keeps it in memory.
    pub fn open(db_path: Option<&Path>, images: ImageStore) -> Result<Self> {
        let conn = db::open_database(db_path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            images,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|e| StudioError::Other(e.to_string()))
    }

    /// Persist `draft` and return its newly assigned id.
    pub fn create(&self, draft: &RecordDraft) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.conn()?;
        db::insert_record(&conn, &id, draft)?;
        info!(record_id = %id, owner = ?draft.owner_id, "Created record");
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Result<ResultRecord> {
        let conn = self.conn()?;
        db::get_record(&conn, id)?.ok_or_else(|| StudioError::NotFound(id.to_string()))
    }

    /// All records of `owner_id`, newest first.
    pub fn list_by_owner(&self, owner_id: Option<&str>) -> Result<Vec<ResultRecord>> {
        let conn = self.conn()?;
        Ok(db::list_records_by_owner(&conn, owner_id)?)
    }

    /// Delete `id` if `requester` owns it, then drop its image.
    ///
    /// Returns `Forbidden` (and deletes nothing) when the owner differs.
    pub fn delete(&self, id: &str, requester: Option<&str>) -> Result<()> {
        let image_reference = {
            let conn = self.conn()?;
            let record =
                db::get_record(&conn, id)?.ok_or_else(|| StudioError::NotFound(id.to_string()))?;

            if !record.is_owned_by(requester) {
                return Err(StudioError::Forbidden(id.to_string()));
            }

            if !db::delete_record(&conn, id)? {
                return Err(StudioError::NotFound(id.to_string()));
            }
            record.image_reference
        };

        self.images.remove_best_effort(&image_reference);
        info!(record_id = %id, "Deleted record");
        Ok(())
    }
}
