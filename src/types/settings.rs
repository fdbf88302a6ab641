use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub transfer: TransferSettings,
    pub logging: LoggingSettings,
}

/// Remote backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://imacampus.lk/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Where downloads live and how much space they may advertise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Overrides the platform downloads directory when set.
    pub downloads_dir: Option<String>,
    /// Displayed storage ceiling in megabytes.
    pub storage_limit_mb: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            downloads_dir: None,
            storage_limit_mb: 5120,
        }
    }
}

/// Transfer polling behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransferSettings {
    pub poll_interval_ms: u64,
    /// Unchanged polls after which a download resumed from an earlier run is
    /// settled as complete or failed. 0 keeps polling until cancelled.
    pub resume_stall_polls: u32,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            resume_stall_polls: 30,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `"info"` or `"classroom_offline=debug"`.
    pub level: String,
    pub file_enabled: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
        }
    }
}
