use std::fmt;

// === StoreError ===

/// Errors raised by the persisted key-value store.
#[derive(Debug)]
pub enum StoreError {
    /// The underlying SQLite operation failed.
    DatabaseError(String),
    /// A value could not be encoded or decoded.
    SerializationError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(msg) => write!(f, "Store database error: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Store serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

// === DownloadError ===

/// Errors related to offline downloads.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadError {
    /// The content-item id cannot be used to build a filename.
    InvalidItemId(String),
    /// A completed download for this id already exists.
    AlreadyDownloaded(String),
    /// The backend returned no usable download URL.
    LinkNotFound(String),
    /// No download with the given id was found.
    NotFound(String),
    /// Resolving the download link failed.
    NetworkError(String),
    /// A file system operation failed.
    FileSystemError(String),
    /// The download index could not be written.
    StorageError(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::InvalidItemId(id) => write!(f, "Invalid content item id: {:?}", id),
            DownloadError::AlreadyDownloaded(id) => write!(f, "Already downloaded: {}", id),
            DownloadError::LinkNotFound(id) => write!(f, "Download link not found: {}", id),
            DownloadError::NotFound(id) => write!(f, "Download not found: {}", id),
            DownloadError::NetworkError(msg) => write!(f, "Download network error: {}", msg),
            DownloadError::FileSystemError(msg) => {
                write!(f, "Download file system error: {}", msg)
            }
            DownloadError::StorageError(msg) => write!(f, "Download storage error: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<StoreError> for DownloadError {
    fn from(e: StoreError) -> Self {
        DownloadError::StorageError(e.to_string())
    }
}

// === TransferError ===

/// Errors reported by a background transfer.
#[derive(Debug, PartialEq)]
pub enum TransferError {
    /// The transfer was aborted through its cancellation token.
    Cancelled,
    /// The remote server answered with a non-success status.
    HttpStatus(u16),
    /// The connection failed or the body stream broke.
    Network(String),
    /// Writing the destination file failed.
    Io(String),
    /// A file left by an earlier run stopped growing before it was complete.
    Stalled,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Cancelled => write!(f, "Transfer cancelled"),
            TransferError::HttpStatus(code) => write!(f, "Transfer failed with HTTP status {}", code),
            TransferError::Network(msg) => write!(f, "Transfer network error: {}", msg),
            TransferError::Io(msg) => write!(f, "Transfer I/O error: {}", msg),
            TransferError::Stalled => write!(f, "Transfer stopped making progress"),
        }
    }
}

impl std::error::Error for TransferError {}

// === ApiError ===

/// Errors returned by the remote backend client.
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be sent or the connection dropped.
    NetworkError(String),
    /// The backend answered with a non-success status.
    HttpStatus(u16, String),
    /// The response body did not match the documented contract.
    InvalidResponse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NetworkError(msg) => write!(f, "API network error: {}", msg),
            ApiError::HttpStatus(code, body) => write!(f, "API error {}: {}", code, body),
            ApiError::InvalidResponse(msg) => write!(f, "Invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

// === SessionError ===

/// Errors related to the signed-in session.
#[derive(Debug)]
pub enum SessionError {
    /// No session is stored.
    NotLoggedIn,
    /// The store could not be read or written.
    StoreError(String),
    /// The stored profile could not be encoded or decoded.
    SerializationError(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotLoggedIn => write!(f, "Not logged in"),
            SessionError::StoreError(msg) => write!(f, "Session store error: {}", msg),
            SessionError::SerializationError(msg) => {
                write!(f, "Session serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::StoreError(e.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// File I/O error.
    IoError(String),
    /// JSON serialization/deserialization error.
    SerializationError(String),
    /// The settings key is invalid.
    InvalidKey(String),
    /// The settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}
