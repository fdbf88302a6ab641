//! Classroom Offline RPC Server: JSON-RPC over stdin/stdout for the app shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"downloads.start", "params":{"item":{...}}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":...}
//! Event:    {"event":"progress", "id":"42", "percent":"17%"}

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use classroom_offline::app::App;
use classroom_offline::logging;
use classroom_offline::managers::transfer_controller::TransferControllerTrait;
use classroom_offline::rpc_handler::handle_method;
use classroom_offline::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use classroom_offline::types::alert::UserAlert;
use classroom_offline::types::download::TransferEvent;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn event_line(event: &TransferEvent) -> Value {
    let mut payload = json!(event);
    if matches!(event, TransferEvent::Completed { .. }) {
        payload["alert"] = json!(UserAlert::download_complete());
    }
    payload
}

/// Single owner of stdout so responses and events never interleave mid-line.
fn spawn_writer() -> mpsc::UnboundedSender<Value> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            let mut bytes = line.to_string().into_bytes();
            bytes.push(b'\n');
            if stdout.write_all(&bytes).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });
    tx
}

fn spawn_event_forwarder(app: &App, out: mpsc::UnboundedSender<Value>) {
    let mut events = app.transfers.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if out.send(event_line(&event)).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() {
    let mut settings_engine = SettingsEngine::new(std::env::var("CLASSROOM_OFFLINE_CONFIG").ok());
    let load_error = settings_engine.load().err();
    let _log_guard = logging::init(&settings_engine.get_settings().logging);
    if let Some(e) = load_error {
        warn!(error = %e, "using default settings");
    }

    // CLASSROOM_OFFLINE_DATA_DIR relocates the database, e.g. for a portable install.
    let app = match std::env::var("CLASSROOM_OFFLINE_DATA_DIR") {
        Ok(dir) => App::open_in(settings_engine, Path::new(&dir)),
        Err(_) => App::new(settings_engine),
    };
    let app = match app {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!(error = %e, "failed to initialise");
            std::process::exit(1);
        }
    };

    let out = spawn_writer();
    spawn_event_forwarder(&app, out.clone());
    app.startup().await;

    let _ = out.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    info!("rpc server ready");

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = out.send(json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            let _ = out.send(json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));

        // Requests run concurrently so a cancel is not stuck behind a start
        // that is still resolving its link.
        let app = Arc::clone(&app);
        let out = out.clone();
        tokio::spawn(async move {
            let response = match handle_method(&app, &method, &params).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => json!({"id": id, "error": err}),
            };
            let _ = out.send(response);
        });
    }

    app.shutdown();
    info!("rpc server stopped");
}
