//! Process-wide tracing setup.
//!
//! Console output always goes to stderr (stdout carries the RPC protocol).
//! When file logging is enabled a daily-rotated `classroom-offline.log` is
//! written under the log directory through a non-blocking writer.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::platform;
use crate::types::settings::LoggingSettings;

const LOG_FILE_PREFIX: &str = "classroom-offline.log";

fn filter_for(level: &str) -> EnvFilter {
    // RUST_LOG overrides the configured level.
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber, logging to files under the platform log
/// directory when enabled. Call once at startup.
///
/// Returns the file writer's guard; keep it alive for the life of the
/// process or buffered lines are lost. A second call is a no-op.
pub fn init(settings: &LoggingSettings) -> Option<WorkerGuard> {
    init_in(settings, &platform::get_log_dir())
}

/// Same as [`init`] with an explicit log directory.
pub fn init_in(settings: &LoggingSettings, log_dir: &Path) -> Option<WorkerGuard> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .with_filter(filter_for(&settings.level));

    let (file_layer, guard) = if settings.file_enabled {
        match std::fs::create_dir_all(log_dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(filter_for(&settings.level));
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("file logging disabled, cannot create {}: {}", log_dir.display(), e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init();

    guard
}
