// Classroom Offline platform paths for Windows
// Config: %APPDATA%/ClassroomOffline
// Data:   %LOCALAPPDATA%/ClassroomOffline
// Logs:   %LOCALAPPDATA%/ClassroomOffline/logs

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "ClassroomOffline";

fn roaming() -> PathBuf {
    PathBuf::from(
        env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming")),
    )
}

fn local() -> PathBuf {
    PathBuf::from(
        env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Local")),
    )
}

pub fn get_config_dir() -> PathBuf {
    roaming().join(APP_DIR)
}

/// Downloads can be large, so they stay out of the roaming profile.
pub fn get_data_dir() -> PathBuf {
    local().join(APP_DIR)
}

pub fn get_log_dir() -> PathBuf {
    local().join(APP_DIR).join("logs")
}
