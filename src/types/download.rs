use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::api::{de_string_or_number, de_u64_lenient};
use crate::types::errors::DownloadError;

/// Longest content-item id accepted as part of a filename.
pub const MAX_ITEM_ID_LEN: usize = 128;

/// A finished download that lives in the app-private downloads directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadRecord {
    pub id: String,
    pub title: String,
    /// Absolute path recorded at completion. Informational only; the
    /// index resolves the live path from `file_name`.
    pub file_path: String,
    pub file_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    /// Filled from a filesystem stat on every listing, never persisted.
    #[serde(skip)]
    pub size_bytes: u64,
}

impl DownloadRecord {
    /// Builds a completed "recording" record for a file that just finished.
    pub fn recording(id: &str, title: &str, path: PathBuf) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            file_path: path.to_string_lossy().to_string(),
            file_name: file_name_for(id),
            kind: "recording".to_string(),
            created_at: Utc::now(),
            size_bytes: 0,
        }
    }
}

/// Bookkeeping for a transfer that has not finished yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveDownloadRecord {
    #[serde(default)]
    pub id: String,
    /// Last observed progress, e.g. `"42%"`.
    pub percent: String,
    /// Expected final size as reported by the backend.
    #[serde(alias = "total", deserialize_with = "de_u64_lenient")]
    pub total_bytes: u64,
    #[serde(default)]
    pub title: String,
}

impl ActiveDownloadRecord {
    pub fn new(id: &str, total_bytes: u64) -> Self {
        Self {
            id: id.to_string(),
            percent: "0%".to_string(),
            total_bytes,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

/// A downloadable entry of a course module, as listed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    #[serde(deserialize_with = "de_string_or_number")]
    pub id: String,
    pub title: String,
    /// Backend reference used to resolve the recording download link.
    #[serde(alias = "zoomMeetingId", deserialize_with = "de_string_or_number")]
    pub meeting_id: String,
}

/// What a content item looks like to the view that displays it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemState {
    Idle,
    Downloading { percent: String },
    Downloaded,
}

/// Result of asking the controller to start a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new transfer was started.
    Started,
    /// A transfer for this id is already running; nothing was started.
    AlreadyActive,
    /// The download was cancelled before its transfer began.
    Cancelled,
}

/// Notifications published while transfers run.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransferEvent {
    Progress { id: String, percent: String },
    Completed { id: String, record: DownloadRecord },
    Failed { id: String, reason: String },
    Cancelled { id: String },
}

/// Checks that an id can be embedded in a filename without escaping the
/// downloads directory.
pub fn validate_item_id(id: &str) -> Result<(), DownloadError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ITEM_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DownloadError::InvalidItemId(id.to_string()))
    }
}

/// Deterministic filename for a content item.
pub fn file_name_for(id: &str) -> String {
    format!("f_{}.mp4", id)
}

/// Formats a progress percentage the way it is persisted.
pub fn percent_string(current_bytes: u64, total_bytes: u64) -> Option<String> {
    if total_bytes == 0 {
        return None;
    }
    let ratio = current_bytes as f64 / total_bytes as f64;
    let pct = ((ratio * 100.0).round() as u64).min(100);
    Some(format!("{}%", pct))
}
