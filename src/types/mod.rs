// Shared type definitions
// Each submodule defines types used across the crate.

pub mod alert;
pub mod api;
pub mod download;
pub mod errors;
pub mod session;
pub mod settings;
