//! Storage Reconciler.
//!
//! Cross-checks the download index against the filesystem on every view load
//! and reports how much space the surviving downloads use. Also owns removal
//! of a completed download, which touches both the file and the index.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::managers::download_index::{DownloadIndex, DownloadIndexTrait};
use crate::types::download::DownloadRecord;
use crate::types::errors::DownloadError;

/// Bytes per reported megabyte.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StorageReport {
    /// Surviving downloads, most recent first.
    pub records: Vec<DownloadRecord>,
    pub total_bytes: u64,
}

impl StorageReport {
    /// Total usage in megabytes, unrounded.
    pub fn total_mb(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_MB
    }
}

/// Rounds a megabyte figure to one decimal place for display.
pub fn round_mb(mb: f64) -> f64 {
    (mb * 10.0).round() / 10.0
}

/// Megabytes for a byte count, rounded to one decimal place.
pub fn bytes_to_display_mb(bytes: u64) -> f64 {
    round_mb(bytes as f64 / BYTES_PER_MB)
}

/// Trait defining storage reconciliation operations.
pub trait StorageReconcilerTrait {
    fn reconcile(&self) -> StorageReport;
    fn delete_download(&self, id: &str) -> Result<(), DownloadError>;
}

pub struct StorageReconciler {
    index: Arc<DownloadIndex>,
}

impl StorageReconciler {
    pub fn new(index: Arc<DownloadIndex>) -> Self {
        Self { index }
    }
}

impl StorageReconcilerTrait for StorageReconciler {
    /// Drops index entries without a file, then sums the sizes of the rest.
    /// Cheap enough to run on every view entry; nothing is cached.
    fn reconcile(&self) -> StorageReport {
        let mut records = self.index.list_completed();
        let total_bytes = records.iter().map(|r| r.size_bytes).sum();
        records.reverse();
        StorageReport {
            records,
            total_bytes,
        }
    }

    /// Deletes the file of a completed download and forgets it.
    fn delete_download(&self, id: &str) -> Result<(), DownloadError> {
        let record = self
            .index
            .get_completed(id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))?;

        let path = if record.file_name.is_empty() {
            self.index.file_path_for(id)
        } else {
            self.index.downloads_dir().join(&record.file_name)
        };
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(id, error = %e, "failed to delete downloaded file");
                return Err(DownloadError::FileSystemError(e.to_string()));
            }
        }

        self.index.remove_completed(id)?;
        info!(id, "download deleted");
        Ok(())
    }
}
