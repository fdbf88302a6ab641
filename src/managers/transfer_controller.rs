//! Transfer Controller.
//!
//! Drives one download per content item through Idle -> Downloading ->
//! Idle (completed or cancelled). Progress is approximated by stat-ing the
//! destination file on a fixed interval; the transfer itself is owned by a
//! [`TransferBackend`] that only reports its terminal outcome.
//!
//! Each running download holds a slot keyed by content-item id. The slot is
//! reserved before the backend is contacted, so a second start for the same id
//! is a no-op, and it carries a generation number so an outcome that arrives
//! after cancellation (or after a newer transfer took over the id) is ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::managers::download_index::{DownloadIndex, DownloadIndexTrait};
use crate::services::backend_client::RecordingApi;
use crate::services::http_transfer::TransferBackend;
use crate::types::download::{
    percent_string, validate_item_id, ActiveDownloadRecord, ContentItem, DownloadRecord,
    ItemState, StartOutcome, TransferEvent,
};
use crate::types::errors::{DownloadError, TransferError};
use crate::types::session::Session;
use crate::types::settings::TransferSettings;

const EVENT_CHANNEL_CAPACITY: usize = 256;

struct Slot {
    generation: u64,
    cancel: CancellationToken,
}

/// Watches a download resumed from an earlier run, which no transfer in this
/// process is writing. Once the file size stops changing the download is
/// settled.
struct StallWatch {
    generation: u64,
    title: String,
    limit: u32,
    last_size: Option<Option<u64>>,
    unchanged: u32,
}

impl StallWatch {
    /// Records one poll. Returns true once the size has been unchanged for
    /// `limit` consecutive polls.
    fn observe(&mut self, size: Option<u64>) -> bool {
        if self.last_size.replace(size) == Some(size) {
            self.unchanged += 1;
        } else {
            self.unchanged = 0;
        }
        self.limit > 0 && self.unchanged >= self.limit
    }
}

/// State shared with the polling and transfer tasks.
struct Shared {
    index: Arc<DownloadIndex>,
    slots: Mutex<HashMap<String, Slot>>,
    generation: AtomicU64,
    events: broadcast::Sender<TransferEvent>,
}

impl Shared {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: TransferEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Reserves the slot for `id`. Returns `None` when a slot already exists.
    fn reserve(&self, id: &str) -> Option<(u64, CancellationToken)> {
        let mut slots = self.slots();
        if slots.contains_key(id) {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        slots.insert(
            id.to_string(),
            Slot {
                generation,
                cancel: cancel.clone(),
            },
        );
        Some((generation, cancel))
    }

    /// Removes the slot for `id` only if it still belongs to `generation`.
    fn release(&self, id: &str, generation: u64) -> bool {
        let mut slots = self.slots();
        match slots.get(id) {
            Some(slot) if slot.generation == generation => {
                if let Some(slot) = slots.remove(id) {
                    slot.cancel.cancel();
                }
                true
            }
            _ => false,
        }
    }

    /// Stats the destination and persists the derived percentage. Returns
    /// the observed size, or `None` when the file is missing.
    async fn poll_once(&self, id: &str, dest: &Path, total_bytes: u64) -> Option<u64> {
        let size = tokio::fs::metadata(dest).await.ok()?.len();
        if let Some(percent) = percent_string(size, total_bytes) {
            match self.index.update_active_percent(id, &percent) {
                Ok(true) => self.emit(TransferEvent::Progress {
                    id: id.to_string(),
                    percent,
                }),
                Ok(false) => {}
                Err(e) => debug!(id, error = %e, "failed to persist progress"),
            }
        }
        Some(size)
    }

    /// Settles a resumed download whose file stopped changing: a full-size
    /// file completes, anything else fails and is cleaned up.
    fn settle_stalled(
        &self,
        id: &str,
        dest: &Path,
        total_bytes: u64,
        size: Option<u64>,
        watch: &StallWatch,
    ) {
        let complete = total_bytes > 0 && size.is_some_and(|s| s >= total_bytes);
        debug!(id, complete, "resumed download stopped changing");
        let result = if complete {
            Ok(dest.to_path_buf())
        } else {
            Err(TransferError::Stalled)
        };
        self.finish(id, &watch.title, watch.generation, result);
    }

    /// Cleans up after an outcome that lost its slot. A transfer that kept
    /// writing after cancellation leaves a file nothing tracks; it is removed
    /// unless a newer transfer or a record now owns the id.
    fn discard_stale(&self, id: &str, result: Result<PathBuf, TransferError>) {
        let slots = self.slots();
        if slots.contains_key(id)
            || self.index.get_completed(id).is_some()
            || self.index.get_active(id).is_some()
        {
            debug!(id, "stale transfer outcome, id is owned elsewhere");
            return;
        }
        let path = match result {
            Ok(path) => path,
            Err(_) => self.index.file_path_for(id),
        };
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(id, path = %path.display(), "removed file left by cancelled transfer"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(id, error = %e, "failed to remove file left by cancelled transfer"),
        }
        drop(slots);
    }

    /// Applies the terminal outcome of a transfer.
    fn finish(&self, id: &str, title: &str, generation: u64, result: Result<PathBuf, TransferError>) {
        if !self.release(id, generation) {
            debug!(id, "transfer outcome arrived after cancellation, ignoring");
            self.discard_stale(id, result);
            return;
        }

        match result {
            Ok(path) => {
                if let Err(e) = self.index.remove_active(id) {
                    warn!(id, error = %e, "failed to clear active download");
                }
                let record = DownloadRecord::recording(id, title, path);
                if self.index.get_completed(id).is_none() {
                    if let Err(e) = self.index.upsert_completed(record.clone()) {
                        warn!(id, error = %e, "failed to record completed download");
                        self.emit(TransferEvent::Failed {
                            id: id.to_string(),
                            reason: e.to_string(),
                        });
                        return;
                    }
                }
                info!(id, path = %record.file_path, "download completed");
                self.emit(TransferEvent::Completed {
                    id: id.to_string(),
                    record,
                });
            }
            Err(TransferError::Cancelled) => {
                debug!(id, "transfer stopped by its cancellation token");
            }
            Err(e) => {
                warn!(id, error = %e, "download failed");
                if let Err(e) = self.index.remove_active(id) {
                    warn!(id, error = %e, "failed to clear active download");
                }
                let dest = self.index.file_path_for(id);
                if let Err(e) = std::fs::remove_file(&dest) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(id, error = %e, "failed to remove partial file");
                    }
                }
                self.emit(TransferEvent::Failed {
                    id: id.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Trait defining transfer control operations.
#[async_trait::async_trait]
pub trait TransferControllerTrait {
    async fn start_download(
        &self,
        session: &Session,
        item: &ContentItem,
    ) -> Result<StartOutcome, DownloadError>;
    async fn cancel_download(&self, id: &str) -> Result<(), DownloadError>;
    async fn mount(&self, id: &str) -> Result<ItemState, DownloadError>;
    async fn resume_all(&self) -> Vec<(String, ItemState)>;
    fn active_ids(&self) -> Vec<String>;
    fn subscribe(&self) -> broadcast::Receiver<TransferEvent>;
    fn shutdown(&self);
}

pub struct TransferController {
    shared: Arc<Shared>,
    api: Arc<dyn RecordingApi>,
    backend: Arc<dyn TransferBackend>,
    poll_interval: Duration,
    resume_stall_polls: u32,
}

impl TransferController {
    pub fn new(
        index: Arc<DownloadIndex>,
        api: Arc<dyn RecordingApi>,
        backend: Arc<dyn TransferBackend>,
        poll_interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                index,
                slots: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
                events,
            }),
            api,
            backend,
            poll_interval,
            resume_stall_polls: TransferSettings::default().resume_stall_polls,
        }
    }

    /// Sets how many unchanged polls settle a resumed download. 0 disables it.
    pub fn with_resume_stall_polls(mut self, polls: u32) -> Self {
        self.resume_stall_polls = polls;
        self
    }

    pub fn index(&self) -> &Arc<DownloadIndex> {
        &self.shared.index
    }

    fn spawn_poller(
        &self,
        id: &str,
        dest: PathBuf,
        total_bytes: u64,
        cancel: CancellationToken,
        mut watch: Option<StallWatch>,
    ) {
        let shared = Arc::clone(&self.shared);
        let id = id.to_string();
        let interval = self.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let size = shared.poll_once(&id, &dest, total_bytes).await;
                        if let Some(watch) = watch.as_mut() {
                            if watch.observe(size) {
                                shared.settle_stalled(&id, &dest, total_bytes, size, watch);
                                break;
                            }
                        }
                    }
                }
            }
            debug!(id = %id, "progress polling stopped");
        });
    }

    /// Drops an active record left behind by a transfer this process does
    /// not own and whose file never appeared. Returns the record when it is
    /// still backed by a file.
    async fn check_active(&self, id: &str) -> Result<Option<ActiveDownloadRecord>, DownloadError> {
        let Some(active) = self.shared.index.get_active(id) else {
            return Ok(None);
        };
        let dest = self.shared.index.file_path_for(id);
        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            return Ok(Some(active));
        }
        debug!(id, "orphaned active download, resetting to idle");
        self.shared.index.remove_active(id)?;
        Ok(None)
    }

    fn abandon_start(&self, id: &str, generation: u64) {
        self.shared.release(id, generation);
        if let Err(e) = self.shared.index.remove_active(id) {
            warn!(id, error = %e, "failed to clear active download");
        }
    }
}

#[async_trait::async_trait]
impl TransferControllerTrait for TransferController {
    /// Idle -> Downloading.
    ///
    /// Rejects ids that already have a completed download. A start for an id
    /// that is already downloading returns [`StartOutcome::AlreadyActive`]
    /// without touching anything.
    async fn start_download(
        &self,
        session: &Session,
        item: &ContentItem,
    ) -> Result<StartOutcome, DownloadError> {
        let id = item.id.as_str();
        validate_item_id(id)?;

        if self.shared.index.is_downloaded(id)? {
            return Err(DownloadError::AlreadyDownloaded(id.to_string()));
        }
        if self.shared.slots().contains_key(id) {
            return Ok(StartOutcome::AlreadyActive);
        }
        if self.check_active(id).await?.is_some() {
            // Still owned by a transfer from before this view was mounted.
            return Ok(StartOutcome::AlreadyActive);
        }
        let Some((generation, cancel)) = self.shared.reserve(id) else {
            return Ok(StartOutcome::AlreadyActive);
        };

        let link = match self.api.resolve_recording(session, &item.meeting_id).await {
            Ok(link) => link,
            Err(e) => {
                warn!(id, error = %e, "could not resolve download link");
                self.shared.release(id, generation);
                return Err(DownloadError::NetworkError(e.to_string()));
            }
        };
        let Some(url) = link.usable_url().map(str::to_string) else {
            self.shared.release(id, generation);
            return Err(DownloadError::LinkNotFound(id.to_string()));
        };
        if cancel.is_cancelled() {
            return Ok(StartOutcome::Cancelled);
        }

        let total_bytes = link.file_size;
        if let Err(e) = self
            .shared
            .index
            .upsert_active(ActiveDownloadRecord::new(id, total_bytes).with_title(&item.title))
        {
            self.shared.release(id, generation);
            return Err(e);
        }
        if cancel.is_cancelled() {
            self.abandon_start(id, generation);
            return Ok(StartOutcome::Cancelled);
        }

        let dest = self.shared.index.file_path_for(id);
        if let Err(e) = tokio::fs::create_dir_all(self.shared.index.downloads_dir()).await {
            self.abandon_start(id, generation);
            return Err(DownloadError::FileSystemError(e.to_string()));
        }
        match tokio::fs::remove_file(&dest).await {
            Ok(()) => debug!(id, "removed stale file before download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                self.abandon_start(id, generation);
                return Err(DownloadError::FileSystemError(e.to_string()));
            }
        }

        self.spawn_poller(id, dest.clone(), total_bytes, cancel.clone(), None);

        let shared = Arc::clone(&self.shared);
        let backend = Arc::clone(&self.backend);
        let task_id = id.to_string();
        let title = item.title.clone();
        tokio::spawn(async move {
            let result = backend.fetch(&url, &dest, cancel).await;
            shared.finish(&task_id, &title, generation, result);
        });

        info!(id, total_bytes, "download started");
        Ok(StartOutcome::Started)
    }

    /// Downloading -> Idle. Best-effort abort of the transfer; local
    /// bookkeeping and the partial file are always cleaned up.
    ///
    /// An item that is not downloading is left untouched. In particular the
    /// file of a completed download is never removed here.
    async fn cancel_download(&self, id: &str) -> Result<(), DownloadError> {
        validate_item_id(id)?;

        let slot = self.shared.slots().remove(id);
        let had_slot = slot.is_some();
        if let Some(slot) = slot {
            slot.cancel.cancel();
        }
        if !had_slot && self.shared.index.get_active(id).is_none() {
            debug!(id, "nothing to cancel");
            return Ok(());
        }

        if self.shared.index.get_completed(id).is_none() {
            let dest = self.shared.index.file_path_for(id);
            match tokio::fs::remove_file(&dest).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(id, error = %e, "failed to remove partial file"),
            }
        }
        self.shared.index.remove_active(id)?;

        info!(id, "download cancelled");
        self.shared.emit(TransferEvent::Cancelled { id: id.to_string() });
        Ok(())
    }

    /// Reconciles one content item when its view appears.
    ///
    /// An active record without a file is an orphan and is dropped. An active
    /// record with a file resumes polling against its persisted total without
    /// restarting the transfer. No transfer in this process writes that file,
    /// so once its size stops changing for the configured number of polls it
    /// is recorded as completed (full size) or failed and removed.
    async fn mount(&self, id: &str) -> Result<ItemState, DownloadError> {
        validate_item_id(id)?;

        if self.shared.slots().contains_key(id) {
            let percent = self
                .shared
                .index
                .get_active(id)
                .map(|a| a.percent)
                .unwrap_or_else(|| "0%".to_string());
            return Ok(ItemState::Downloading { percent });
        }

        if let Some(active) = self.check_active(id).await? {
            if let Some((generation, cancel)) = self.shared.reserve(id) {
                let dest = self.shared.index.file_path_for(id);
                let watch = StallWatch {
                    generation,
                    title: active.title.clone(),
                    limit: self.resume_stall_polls,
                    last_size: None,
                    unchanged: 0,
                };
                self.spawn_poller(id, dest, active.total_bytes, cancel, Some(watch));
                debug!(id, percent = %active.percent, "resumed progress polling");
            }
            return Ok(ItemState::Downloading {
                percent: active.percent,
            });
        }

        if self.shared.index.is_downloaded(id)? {
            return Ok(ItemState::Downloaded);
        }
        Ok(ItemState::Idle)
    }

    async fn resume_all(&self) -> Vec<(String, ItemState)> {
        let mut states = Vec::new();
        for active in self.shared.index.list_active() {
            match self.mount(&active.id).await {
                Ok(state) => states.push((active.id, state)),
                Err(e) => {
                    warn!(id = %active.id, error = %e, "dropping unusable active download");
                    if let Err(e) = self.shared.index.remove_active(&active.id) {
                        warn!(id = %active.id, error = %e, "failed to clear active download");
                    }
                }
            }
        }
        states
    }

    fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.shared.slots().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.shared.events.subscribe()
    }

    /// Stops every poll timer and transfer. Persisted bookkeeping is left as
    /// is, the same as if the process had been killed.
    fn shutdown(&self) {
        let drained: Vec<Slot> = self.shared.slots().drain().map(|(_, slot)| slot).collect();
        for slot in drained {
            slot.cancel.cancel();
        }
    }
}

impl Drop for TransferController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
