//! Background transfer backend.
//!
//! A [`TransferBackend`] owns the byte transfer for a single file. It reports
//! only the terminal outcome; progress is observed separately by stat-ing the
//! destination file. [`HttpTransfer`] streams the response body straight into
//! the destination with tokio file I/O.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::types::errors::TransferError;

/// Performs a single file transfer to `dest`.
///
/// Implementations must return `Err(TransferError::Cancelled)` promptly once
/// `cancel` fires.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        cancel: CancellationToken,
    ) -> Result<PathBuf, TransferError>;
}

/// Streams an HTTP GET response body to disk.
#[derive(Clone, Default)]
pub struct HttpTransfer {
    http: Client,
}

impl HttpTransfer {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TransferError::HttpStatus(response.status().as_u16()));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TransferError::Io(e.to_string()))?;
        }
        let mut file = File::create(dest)
            .await
            .map_err(|e| TransferError::Io(e.to_string()))?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| TransferError::Io(e.to_string()))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| TransferError::Io(e.to_string()))?;
        Ok(written)
    }
}

#[async_trait]
impl TransferBackend for HttpTransfer {
    #[instrument(skip(self, url, dest, cancel), fields(dest = %dest.display()))]
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        cancel: CancellationToken,
    ) -> Result<PathBuf, TransferError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransferError::Cancelled),
            result = self.stream_to_file(url, dest) => {
                let written = result?;
                debug!(bytes = written, "transfer finished");
                Ok(dest.to_path_buf())
            }
        }
    }
}
