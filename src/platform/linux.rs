// Classroom Offline platform paths for Linux
// Config: ~/.config/classroom-offline
// Data:   ~/.local/share/classroom-offline
// Logs:   ~/.local/state/classroom-offline/logs

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "classroom-offline";

fn xdg_or_home(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            fallback
                .iter()
                .fold(PathBuf::from(home), |path, part| path.join(part))
        }
    }
}

/// `$XDG_CONFIG_HOME/classroom-offline`, otherwise `~/.config/classroom-offline`.
pub fn get_config_dir() -> PathBuf {
    xdg_or_home("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR)
}

/// `$XDG_DATA_HOME/classroom-offline`, otherwise `~/.local/share/classroom-offline`.
pub fn get_data_dir() -> PathBuf {
    xdg_or_home("XDG_DATA_HOME", &[".local", "share"]).join(APP_DIR)
}

pub fn get_log_dir() -> PathBuf {
    xdg_or_home("XDG_STATE_HOME", &[".local", "state"])
        .join(APP_DIR)
        .join("logs")
}
