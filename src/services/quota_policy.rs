//! Quota Policy.
//!
//! Advisory only: compares used storage with a fixed ceiling for display.
//! Nothing consults it before starting a download.

use serde::Serialize;

use super::storage_reconciler::bytes_to_display_mb;

/// Storage ceiling used when the configuration does not set one.
pub const DEFAULT_STORAGE_LIMIT_MB: u64 = 5120;

/// Used-versus-limit figures for the storage bar.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct QuotaUsage {
    /// Used space in megabytes, rounded to one decimal place.
    pub used_mb: f64,
    pub limit_mb: u64,
    /// Fill level of the storage bar, clamped to `[0.0, 1.0]`.
    pub fraction: f64,
}

impl QuotaUsage {
    /// Renders `"<used> MB / <limit> MB"`.
    pub fn display(&self) -> String {
        format!("{:.1} MB / {} MB", self.used_mb, self.limit_mb)
    }

    pub fn is_over_limit(&self) -> bool {
        self.used_mb > self.limit_mb as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    limit_mb: u64,
}

impl QuotaPolicy {
    pub fn new(limit_mb: u64) -> Self {
        Self { limit_mb }
    }

    pub fn limit_mb(&self) -> u64 {
        self.limit_mb
    }

    pub fn usage(&self, total_bytes: u64) -> QuotaUsage {
        let used_mb = bytes_to_display_mb(total_bytes);
        let fraction = if self.limit_mb == 0 {
            1.0
        } else {
            (used_mb / self.limit_mb as f64).min(1.0)
        };
        QuotaUsage {
            used_mb,
            limit_mb: self.limit_mb,
            fraction,
        }
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_LIMIT_MB)
    }
}
