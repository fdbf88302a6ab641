use serde::Serialize;

use super::errors::DownloadError;

/// Short title/message pair shown to the user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserAlert {
    pub title: String,
    pub message: String,
}

impl UserAlert {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    pub fn download_complete() -> Self {
        Self::new("Success", "Download complete! Check Downloads tab.")
    }

    pub fn deletion_failed() -> Self {
        Self::new("Error", "Deletion failed.")
    }
}

impl From<&DownloadError> for UserAlert {
    fn from(err: &DownloadError) -> Self {
        match err {
            DownloadError::AlreadyDownloaded(_) => {
                UserAlert::new("Saved", "Already downloaded. Check 'Downloads' tab.")
            }
            DownloadError::LinkNotFound(_) => UserAlert::new("Error", "Download link not found"),
            _ => UserAlert::new("Error", "Could not start download."),
        }
    }
}
