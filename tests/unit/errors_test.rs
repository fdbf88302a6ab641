use classroom_offline::types::alert::UserAlert;
use classroom_offline::types::errors::*;

// === StoreError Tests ===

#[test]
fn store_error_display_variants() {
    assert_eq!(
        StoreError::DatabaseError("disk I/O error".to_string()).to_string(),
        "Store database error: disk I/O error"
    );
    assert_eq!(
        StoreError::SerializationError("trailing comma".to_string()).to_string(),
        "Store serialization error: trailing comma"
    );
}

#[test]
fn store_error_from_rusqlite() {
    let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StoreError::DatabaseError(_)));
}

// === DownloadError Tests ===

#[test]
fn download_error_display_variants() {
    assert_eq!(
        DownloadError::InvalidItemId("../x".to_string()).to_string(),
        "Invalid content item id: \"../x\""
    );
    assert_eq!(
        DownloadError::AlreadyDownloaded("42".to_string()).to_string(),
        "Already downloaded: 42"
    );
    assert_eq!(
        DownloadError::LinkNotFound("42".to_string()).to_string(),
        "Download link not found: 42"
    );
    assert_eq!(
        DownloadError::NotFound("7".to_string()).to_string(),
        "Download not found: 7"
    );
    assert_eq!(
        DownloadError::NetworkError("timed out".to_string()).to_string(),
        "Download network error: timed out"
    );
    assert_eq!(
        DownloadError::FileSystemError("read-only".to_string()).to_string(),
        "Download file system error: read-only"
    );
    assert_eq!(
        DownloadError::StorageError("locked".to_string()).to_string(),
        "Download storage error: locked"
    );
}

#[test]
fn download_error_from_store_error() {
    let err: DownloadError = StoreError::DatabaseError("locked".to_string()).into();
    assert_eq!(
        err,
        DownloadError::StorageError("Store database error: locked".to_string())
    );
}

#[test]
fn download_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(DownloadError::NotFound("id".to_string()));
    assert!(err.source().is_none());
}

// === TransferError / ApiError Tests ===

#[test]
fn transfer_error_display_variants() {
    assert_eq!(TransferError::Cancelled.to_string(), "Transfer cancelled");
    assert_eq!(
        TransferError::HttpStatus(403).to_string(),
        "Transfer failed with HTTP status 403"
    );
    assert_eq!(
        TransferError::Network("reset".to_string()).to_string(),
        "Transfer network error: reset"
    );
    assert_eq!(
        TransferError::Io("disk full".to_string()).to_string(),
        "Transfer I/O error: disk full"
    );
    assert_eq!(
        TransferError::Stalled.to_string(),
        "Transfer stopped making progress"
    );
}

#[test]
fn api_error_display_variants() {
    assert_eq!(
        ApiError::NetworkError("dns".to_string()).to_string(),
        "API network error: dns"
    );
    assert_eq!(
        ApiError::HttpStatus(401, "Unauthorized".to_string()).to_string(),
        "API error 401: Unauthorized"
    );
    assert_eq!(
        ApiError::InvalidResponse("missing field".to_string()).to_string(),
        "Invalid API response: missing field"
    );
}

// === SessionError / SettingsError Tests ===

#[test]
fn session_error_display_variants() {
    assert_eq!(SessionError::NotLoggedIn.to_string(), "Not logged in");
    let from_store: SessionError = StoreError::DatabaseError("busy".to_string()).into();
    assert_eq!(
        from_store.to_string(),
        "Session store error: Store database error: busy"
    );
}

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("a.b".to_string()).to_string(),
        "Invalid settings key: a.b"
    );
    assert_eq!(
        SettingsError::InvalidValue("negative".to_string()).to_string(),
        "Invalid settings value: negative"
    );
}

// === Alerts ===

#[test]
fn alerts_for_start_failures() {
    assert_eq!(
        UserAlert::from(&DownloadError::AlreadyDownloaded("1".to_string())),
        UserAlert::new("Saved", "Already downloaded. Check 'Downloads' tab.")
    );
    assert_eq!(
        UserAlert::from(&DownloadError::LinkNotFound("1".to_string())),
        UserAlert::new("Error", "Download link not found")
    );
    assert_eq!(
        UserAlert::from(&DownloadError::NetworkError("x".to_string())),
        UserAlert::new("Error", "Could not start download.")
    );
}

#[test]
fn alerts_for_outcomes() {
    assert_eq!(UserAlert::download_complete().title, "Success");
    assert_eq!(
        UserAlert::download_complete().message,
        "Download complete! Check Downloads tab."
    );
    assert_eq!(
        UserAlert::deletion_failed(),
        UserAlert::new("Error", "Deletion failed.")
    );
}
