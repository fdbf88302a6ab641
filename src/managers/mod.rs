// Classroom Offline state managers
// Managers own persisted state: the download index, the session, and the
// transfers in flight.

pub mod download_index;
pub mod session_manager;
pub mod transfer_controller;
