// Classroom Offline platform paths for macOS
// Config: ~/Library/Application Support/ClassroomOffline
// Data:   ~/Library/Application Support/ClassroomOffline
// Logs:   ~/Library/Logs/ClassroomOffline

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "ClassroomOffline";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn application_support() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join(APP_DIR)
}

pub fn get_config_dir() -> PathBuf {
    application_support()
}

pub fn get_data_dir() -> PathBuf {
    application_support()
}

/// `~/Library/Logs/ClassroomOffline`
pub fn get_log_dir() -> PathBuf {
    home_dir().join("Library").join("Logs").join(APP_DIR)
}
