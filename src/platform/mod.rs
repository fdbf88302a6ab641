// Classroom Offline platform abstraction
// Resolves where settings, the download index database, downloaded files
// and log files live on Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory (holds `settings.json`).
///
/// - **Linux**: `~/.config/classroom-offline` (or `$XDG_CONFIG_HOME/classroom-offline`)
/// - **macOS**: `~/Library/Application Support/ClassroomOffline`
/// - **Windows**: `%APPDATA%/ClassroomOffline`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory (database and `downloads/`).
///
/// - **Linux**: `~/.local/share/classroom-offline` (or `$XDG_DATA_HOME/classroom-offline`)
/// - **macOS**: `~/Library/Application Support/ClassroomOffline`
/// - **Windows**: `%LOCALAPPDATA%/ClassroomOffline`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Returns the platform-specific log directory.
///
/// - **Linux**: `~/.local/state/classroom-offline/logs` (or `$XDG_STATE_HOME/...`)
/// - **macOS**: `~/Library/Logs/ClassroomOffline`
/// - **Windows**: `%LOCALAPPDATA%/ClassroomOffline/logs`
pub fn get_log_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_log_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_log_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_log_dir()
    }
}
