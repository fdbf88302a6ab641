//! App Core for Classroom Offline.
//!
//! Central struct holding the store, the download managers and services,
//! wired together from the loaded settings.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::info;

use crate::database::connection::Database;
use crate::managers::download_index::DownloadIndex;
use crate::managers::session_manager::SessionManager;
use crate::managers::transfer_controller::{TransferController, TransferControllerTrait};
use crate::platform;
use crate::services::backend_client::{BackendClient, RecordingApi};
use crate::services::http_transfer::{HttpTransfer, TransferBackend};
use crate::services::quota_policy::QuotaPolicy;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::storage_reconciler::StorageReconciler;

const DATABASE_FILE: &str = "classroom-offline.db";

/// Central application struct holding all managers and services.
///
/// Settings changed at runtime are persisted immediately, but the paths,
/// base URL and poll interval captured here apply from the next start.
pub struct App {
    pub db: Arc<Database>,
    pub index: Arc<DownloadIndex>,
    pub reconciler: StorageReconciler,
    pub session_manager: SessionManager,
    pub client: Arc<BackendClient>,
    pub transfers: TransferController,
    settings_engine: Mutex<SettingsEngine>,
}

impl App {
    /// Creates a new App from a loaded settings engine, opening the store in
    /// the platform data directory and talking to the configured backend.
    pub fn new(settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = platform::get_data_dir().join(DATABASE_FILE);
        let db = Arc::new(Database::open(&db_path)?);
        let client = Arc::new(BackendClient::new(&settings_engine.get_settings().api)?);
        let api: Arc<dyn RecordingApi> = client.clone();
        Self::with_parts(settings_engine, db, client, api, Arc::new(HttpTransfer::default()))
    }

    /// Creates an App whose database file lives in `data_dir`.
    pub fn open_in(
        settings_engine: SettingsEngine,
        data_dir: &Path,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(data_dir.join(DATABASE_FILE))?);
        let client = Arc::new(BackendClient::new(&settings_engine.get_settings().api)?);
        let api: Arc<dyn RecordingApi> = client.clone();
        Self::with_parts(settings_engine, db, client, api, Arc::new(HttpTransfer::default()))
    }

    /// Wires an App from explicit parts. The recording API and transfer
    /// backend are separate from `client` so either can be replaced.
    pub fn with_parts(
        settings_engine: SettingsEngine,
        db: Arc<Database>,
        client: Arc<BackendClient>,
        api: Arc<dyn RecordingApi>,
        backend: Arc<dyn TransferBackend>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let downloads_dir = settings_engine.downloads_dir();
        let transfer_settings = &settings_engine.get_settings().transfer;
        let poll_interval = Duration::from_millis(transfer_settings.poll_interval_ms.max(1));
        let resume_stall_polls = transfer_settings.resume_stall_polls;

        let index = Arc::new(DownloadIndex::new(db.clone(), downloads_dir.clone()));
        let reconciler = StorageReconciler::new(index.clone());
        let session_manager = SessionManager::new(db.clone());
        let transfers = TransferController::new(index.clone(), api, backend, poll_interval)
            .with_resume_stall_polls(resume_stall_polls);

        info!(downloads_dir = %downloads_dir.display(), "application initialised");

        Ok(Self {
            db,
            index,
            reconciler,
            session_manager,
            client,
            transfers,
            settings_engine: Mutex::new(settings_engine),
        })
    }

    pub fn settings_engine(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Quota policy for the currently configured storage limit.
    pub fn quota(&self) -> QuotaPolicy {
        QuotaPolicy::new(self.settings_engine().get_settings().storage.storage_limit_mb)
    }

    /// Startup sequence: pick up transfers persisted by a previous run.
    pub async fn startup(&self) {
        let resumed = self.transfers.resume_all().await;
        if !resumed.is_empty() {
            info!(count = resumed.len(), "resumed persisted downloads");
        }
    }

    /// Shutdown sequence: stop every poll timer and transfer.
    pub fn shutdown(&self) {
        self.transfers.shutdown();
    }
}
