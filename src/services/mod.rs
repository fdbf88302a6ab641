// Classroom Offline services
// Services wrap the backend, byte transfers, storage accounting and settings.

pub mod backend_client;
pub mod http_transfer;
pub mod quota_policy;
pub mod settings_engine;
pub mod storage_reconciler;
