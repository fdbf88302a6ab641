//! Persisted download index.
//!
//! Tracks completed downloads (`my_downloads`, an ordered JSON array) and
//! in-flight transfers (`active_downloads`, a JSON object keyed by content-item
//! id) in the key-value store. Every mutation rewrites the whole blob while
//! holding the connection lock, so concurrent callers never lose updates.
//!
//! The filesystem is the ground truth for existence: completed records whose
//! file is gone are dropped whenever the index is read. Unreadable blobs are
//! treated as empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::database::kv_store::{self, ACTIVE_DOWNLOADS_KEY, MY_DOWNLOADS_KEY};
use crate::database::Database;
use crate::types::download::{file_name_for, ActiveDownloadRecord, DownloadRecord};
use crate::types::errors::DownloadError;

/// Trait defining download index operations.
pub trait DownloadIndexTrait {
    fn list_completed(&self) -> Vec<DownloadRecord>;
    fn list_active(&self) -> Vec<ActiveDownloadRecord>;
    fn get_completed(&self, id: &str) -> Option<DownloadRecord>;
    fn is_downloaded(&self, id: &str) -> Result<bool, DownloadError>;
    fn get_active(&self, id: &str) -> Option<ActiveDownloadRecord>;
    fn upsert_completed(&self, record: DownloadRecord) -> Result<(), DownloadError>;
    fn remove_completed(&self, id: &str) -> Result<bool, DownloadError>;
    fn upsert_active(&self, record: ActiveDownloadRecord) -> Result<(), DownloadError>;
    fn remove_active(&self, id: &str) -> Result<bool, DownloadError>;
    fn update_active_percent(&self, id: &str, percent: &str) -> Result<bool, DownloadError>;
}

/// Download index backed by the key-value store.
pub struct DownloadIndex {
    db: Arc<Database>,
    downloads_dir: PathBuf,
}

impl DownloadIndex {
    pub fn new(db: Arc<Database>, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            downloads_dir: downloads_dir.into(),
        }
    }

    /// App-private directory holding every downloaded file.
    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Destination path of the file for a content item.
    pub fn file_path_for(&self, id: &str) -> PathBuf {
        self.downloads_dir.join(file_name_for(id))
    }

    fn resolve_path(&self, record: &DownloadRecord) -> PathBuf {
        if record.file_name.is_empty() {
            self.file_path_for(&record.id)
        } else {
            self.downloads_dir.join(&record.file_name)
        }
    }

    fn read_completed(conn: &Connection) -> Vec<DownloadRecord> {
        let raw = match kv_store::get_item(conn, MY_DOWNLOADS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read completed downloads, treating as empty");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "completed downloads index is corrupt, treating as empty");
            Vec::new()
        })
    }

    fn write_completed(conn: &Connection, records: &[DownloadRecord]) -> Result<(), DownloadError> {
        let json = serde_json::to_string(records)
            .map_err(|e| DownloadError::StorageError(e.to_string()))?;
        kv_store::set_item(conn, MY_DOWNLOADS_KEY, &json)?;
        Ok(())
    }

    fn read_active(conn: &Connection) -> BTreeMap<String, ActiveDownloadRecord> {
        let raw = match kv_store::get_item(conn, ACTIVE_DOWNLOADS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, "failed to read active downloads, treating as empty");
                return BTreeMap::new();
            }
        };
        let mut map: BTreeMap<String, ActiveDownloadRecord> = serde_json::from_str(&raw)
            .unwrap_or_else(|e| {
                warn!(error = %e, "active downloads index is corrupt, treating as empty");
                BTreeMap::new()
            });
        for (id, record) in map.iter_mut() {
            if record.id.is_empty() {
                record.id = id.clone();
            }
        }
        map
    }

    fn write_active(
        conn: &Connection,
        active: &BTreeMap<String, ActiveDownloadRecord>,
    ) -> Result<(), DownloadError> {
        let json = serde_json::to_string(active)
            .map_err(|e| DownloadError::StorageError(e.to_string()))?;
        kv_store::set_item(conn, ACTIVE_DOWNLOADS_KEY, &json)?;
        Ok(())
    }
}

impl DownloadIndexTrait for DownloadIndex {
    /// Returns every completed download whose file still exists, with
    /// `size_bytes` taken from the file. Stale entries are dropped from the
    /// store as a side effect.
    fn list_completed(&self) -> Vec<DownloadRecord> {
        let conn = self.db.connection();
        let stored = Self::read_completed(&conn);
        let stored_len = stored.len();

        let mut valid = Vec::with_capacity(stored_len);
        for mut record in stored {
            let path = self.resolve_path(&record);
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {
                    record.file_path = path.to_string_lossy().to_string();
                    if record.file_name.is_empty() {
                        record.file_name = file_name_for(&record.id);
                    }
                    record.size_bytes = meta.len();
                    valid.push(record);
                }
                _ => debug!(id = %record.id, path = %path.display(), "dropping download with missing file"),
            }
        }

        if valid.len() != stored_len {
            if let Err(e) = Self::write_completed(&conn, &valid) {
                warn!(error = %e, "failed to persist healed download index");
            }
        }
        valid
    }

    fn list_active(&self) -> Vec<ActiveDownloadRecord> {
        let conn = self.db.connection();
        Self::read_active(&conn).into_values().collect()
    }

    fn get_completed(&self, id: &str) -> Option<DownloadRecord> {
        let conn = self.db.connection();
        Self::read_completed(&conn).into_iter().find(|r| r.id == id)
    }

    /// True when a completed record exists and its file is on disk. A record
    /// without a file is purged on the spot.
    fn is_downloaded(&self, id: &str) -> Result<bool, DownloadError> {
        let conn = self.db.connection();
        let mut records = Self::read_completed(&conn);
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        if self.resolve_path(&records[pos]).is_file() {
            return Ok(true);
        }
        debug!(id, "completed record has no file, purging");
        records.remove(pos);
        Self::write_completed(&conn, &records)?;
        Ok(false)
    }

    fn get_active(&self, id: &str) -> Option<ActiveDownloadRecord> {
        let conn = self.db.connection();
        Self::read_active(&conn).remove(id)
    }

    fn upsert_completed(&self, record: DownloadRecord) -> Result<(), DownloadError> {
        let conn = self.db.connection();
        let mut records = Self::read_completed(&conn);
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Self::write_completed(&conn, &records)
    }

    fn remove_completed(&self, id: &str) -> Result<bool, DownloadError> {
        let conn = self.db.connection();
        let mut records = Self::read_completed(&conn);
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        Self::write_completed(&conn, &records)?;
        Ok(true)
    }

    fn upsert_active(&self, record: ActiveDownloadRecord) -> Result<(), DownloadError> {
        let conn = self.db.connection();
        let mut active = Self::read_active(&conn);
        active.insert(record.id.clone(), record);
        Self::write_active(&conn, &active)
    }

    fn remove_active(&self, id: &str) -> Result<bool, DownloadError> {
        let conn = self.db.connection();
        let mut active = Self::read_active(&conn);
        if active.remove(id).is_none() {
            return Ok(false);
        }
        Self::write_active(&conn, &active)?;
        Ok(true)
    }

    /// Records new progress for an in-flight transfer. Returns `false` and
    /// writes nothing when the record is gone, so a late polling tick cannot
    /// bring back a finished or cancelled download.
    fn update_active_percent(&self, id: &str, percent: &str) -> Result<bool, DownloadError> {
        let conn = self.db.connection();
        let mut active = Self::read_active(&conn);
        match active.get_mut(id) {
            Some(record) if record.percent == percent => Ok(true),
            Some(record) => {
                record.percent = percent.to_string();
                Self::write_active(&conn, &active)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
