use crate::types::{Language, MarketingCopy, RecordDraft, ResultRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    id                  TEXT PRIMARY KEY,
    owner_id            TEXT,
    image_path          TEXT NOT NULL,
    caption_primary     TEXT NOT NULL,
    caption_secondary   TEXT NOT NULL,
    tags_json           TEXT NOT NULL,
    marketing_en        TEXT NOT NULL,
    marketing_cn        TEXT NOT NULL,
    marketing_fr        TEXT NOT NULL,
    created_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_owner_created ON records(owner_id, created_at);
"#;

const SELECT_COLUMNS: &str = "id, owner_id, image_path, caption_primary, caption_secondary, \
     tags_json, marketing_en, marketing_cn, marketing_fr, created_at";

/// Open (or create) the record database. Pass `None` for an in-memory database.
pub fn open_database(path: Option<&std::path::Path>) -> Result<Connection> {
    let conn = match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            Connection::open(p).context("Failed to open record database")?
        }
        None => Connection::open_in_memory().context("Failed to open in-memory database")?,
    };

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )
    .context("Failed to set PRAGMA options")?;

    conn.execute_batch(SCHEMA)
        .context("Failed to create record schema")?;

    Ok(conn)
}

/// Current time at the precision the table stores.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Bad created_at value '{}'", s))?
        .with_timezone(&Utc))
}

/// Insert a new record under `id`.
pub fn insert_record(conn: &Connection, id: &str, draft: &RecordDraft) -> Result<()> {
    let marketing = |language: Language| -> Result<String> {
        let copy = draft.marketing.get(&language).cloned().unwrap_or_default();
        Ok(serde_json::to_string(&copy)?)
    };

    conn.execute(
        "INSERT INTO records (id, owner_id, image_path, caption_primary, caption_secondary,
                              tags_json, marketing_en, marketing_cn, marketing_fr, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id,
            draft.owner_id,
            draft.image_reference,
            draft.caption_primary,
            draft.caption_secondary,
            serde_json::to_string(&draft.tags)?,
            marketing(Language::English)?,
            marketing(Language::Chinese)?,
            marketing(Language::French)?,
            format_timestamp(&draft.created_at),
        ],
    )
    .context("Failed to insert record")?;
    Ok(())
}

/// Raw column values of one row, decoded after the statement finishes.
struct RecordRow {
    id: String,
    owner_id: Option<String>,
    image_path: String,
    caption_primary: String,
    caption_secondary: String,
    tags_json: String,
    marketing: [String; 3],
    created_at: String,
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            image_path: row.get(2)?,
            caption_primary: row.get(3)?,
            caption_secondary: row.get(4)?,
            tags_json: row.get(5)?,
            marketing: [row.get(6)?, row.get(7)?, row.get(8)?],
            created_at: row.get(9)?,
        })
    }

    fn decode(self) -> Result<ResultRecord> {
        let tags: Vec<String> = serde_json::from_str(&self.tags_json)
            .with_context(|| format!("Failed to parse tags of record {}", self.id))?;

        let mut marketing = BTreeMap::new();
        for (language, json) in Language::ALL.iter().zip(self.marketing.iter()) {
            let copy: MarketingCopy = serde_json::from_str(json).with_context(|| {
                format!("Failed to parse {} marketing of record {}", language, self.id)
            })?;
            marketing.insert(*language, copy);
        }

        Ok(ResultRecord {
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            owner_id: self.owner_id,
            image_reference: self.image_path,
            caption_primary: self.caption_primary,
            caption_secondary: self.caption_secondary,
            tags,
            marketing,
        })
    }
}

/// Get a single record by ID.
pub fn get_record(conn: &Connection, id: &str) -> Result<Option<ResultRecord>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {} FROM records WHERE id = ?1", SELECT_COLUMNS))
        .context("Failed to prepare get_record query")?;

    let mut rows = stmt.query(params![id])?;

    if let Some(row) = rows.next().context("Failed to read record row")? {
        Ok(Some(RecordRow::from_row(row)?.decode()?))
    } else {
        Ok(None)
    }
}

/// List an owner's records, newest first. `None` lists records without owner.
pub fn list_records_by_owner(conn: &Connection, owner_id: Option<&str>) -> Result<Vec<ResultRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM records
             WHERE owner_id IS ?1
             ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))
        .context("Failed to prepare list_records_by_owner query")?;

    let rows = stmt
        .query_map(params![owner_id], RecordRow::from_row)
        .context("Failed to execute list_records_by_owner query")?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row.context("Failed to read record row")?.decode()?);
    }
    Ok(records)
}

/// Delete a record row. Returns whether a row was removed.
pub fn delete_record(conn: &Connection, id: &str) -> Result<bool> {
    let count = conn
        .execute("DELETE FROM records WHERE id = ?1", params![id])
        .context("Failed to delete record")?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CopyType;
    use chrono::TimeZone;

    fn setup() -> Connection {
        open_database(None).unwrap()
    }

    fn draft(owner: Option<&str>, secs: u32) -> RecordDraft {
        let copy: MarketingCopy = CopyType::ALL
            .iter()
            .map(|t| (*t, format!("{} copy", t)))
            .collect();
        RecordDraft {
            owner_id: owner.map(str::to_string),
            image_reference: "static/uploads/x.jpg".to_string(),
            caption_primary: "A cat on a sofa".to_string(),
            caption_secondary: "A sofa with a cat".to_string(),
            tags: vec!["cat".into(), "sofa".into()],
            marketing: Language::ALL.iter().map(|l| (*l, copy.clone())).collect(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, secs).unwrap(),
        }
    }

    #[test]
    fn test_open_in_memory() {
        let conn = open_database(None);
        assert!(conn.is_ok());
    }

    #[test]
    fn test_open_file_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.db");
        assert!(open_database(Some(&path)).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let conn = setup();
        let d = draft(Some("alice"), 0);
        insert_record(&conn, "rec-1", &d).unwrap();

        let record = get_record(&conn, "rec-1").unwrap().unwrap();
        assert_eq!(record, d.into_record("rec-1"));
    }

    #[test]
    fn test_get_record_not_found() {
        let conn = setup();
        assert!(get_record(&conn, "nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_list_filters_owner_and_orders_newest_first() {
        let conn = setup();
        insert_record(&conn, "a-old", &draft(Some("alice"), 1)).unwrap();
        insert_record(&conn, "b-mid", &draft(Some("bob"), 2)).unwrap();
        insert_record(&conn, "a-new", &draft(Some("alice"), 3)).unwrap();
        insert_record(&conn, "anon", &draft(None, 4)).unwrap();

        let ids: Vec<String> = list_records_by_owner(&conn, Some("alice"))
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a-new", "a-old"]);

        let anon = list_records_by_owner(&conn, None).unwrap();
        assert_eq!(anon.len(), 1);
        assert_eq!(anon[0].id, "anon");
    }

    #[test]
    fn test_same_timestamp_lists_latest_insert_first() {
        let conn = setup();
        insert_record(&conn, "first", &draft(None, 5)).unwrap();
        insert_record(&conn, "second", &draft(None, 5)).unwrap();

        let records = list_records_by_owner(&conn, None).unwrap();
        assert_eq!(records[0].id, "second");
        assert_eq!(records[1].id, "first");
    }

    #[test]
    fn test_delete_record() {
        let conn = setup();
        insert_record(&conn, "rec-1", &draft(None, 0)).unwrap();
        assert!(delete_record(&conn, "rec-1").unwrap());
        assert!(!delete_record(&conn, "rec-1").unwrap());
        assert!(get_record(&conn, "rec-1").unwrap().is_none());
    }

    #[test]
    fn test_timestamp_now_survives_storage() {
        let conn = setup();
        let mut d = draft(None, 0);
        d.created_at = timestamp_now();
        insert_record(&conn, "rec-1", &d).unwrap();
        let record = get_record(&conn, "rec-1").unwrap().unwrap();
        assert_eq!(record.created_at, d.created_at);
    }
}
