//! RPC method handler for the Classroom Offline JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! appropriate managers and services via the `App` struct.
//!
//! Failures that the user should see come back as `{"title", "message"}`
//! alert objects; protocol misuse (missing params, unknown method) comes back
//! as a plain string.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::app::App;
use crate::managers::session_manager::SessionManagerTrait;
use crate::managers::transfer_controller::TransferControllerTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::storage_reconciler::{bytes_to_display_mb, StorageReconcilerTrait};
use crate::types::alert::UserAlert;
use crate::types::download::{ContentItem, StartOutcome};

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, Value> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Value::from(format!("missing {}", key)))
}

fn alert(alert: UserAlert) -> Value {
    json!(alert)
}

fn outcome_name(outcome: StartOutcome) -> &'static str {
    match outcome {
        StartOutcome::Started => "started",
        StartOutcome::AlreadyActive => "already_active",
        StartOutcome::Cancelled => "cancelled",
    }
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(Value)` carrying either an alert
/// object or an error string.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, Value> {
    debug!(method, "rpc call");
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Session ───
        "session.login" => {
            let username = str_param(params, "username")?;
            let password = str_param(params, "password")?;
            let response = app
                .client
                .login(username, password)
                .await
                .map_err(|e| alert(UserAlert::new("Login failed", &e.to_string())))?;
            let session = app
                .session_manager
                .login(&response.token, response.user)
                .map_err(|e| e.to_string())?;
            Ok(json!({"user": session.user}))
        }
        "session.restore" => match app.session_manager.restore() {
            Some(session) => Ok(json!({"logged_in": true, "user": session.user})),
            None => Ok(json!({"logged_in": false, "user": null})),
        },
        "session.logout" => {
            app.session_manager.logout().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "session.update_user" => {
            let patch: Map<String, Value> = params
                .get("user")
                .and_then(|v| v.as_object())
                .cloned()
                .ok_or("missing user")?;
            let session = app
                .session_manager
                .update_user_info(patch)
                .map_err(|e| e.to_string())?;
            Ok(json!({"user": session.user}))
        }

        // ─── Downloads ───
        "downloads.mount" => {
            let id = str_param(params, "id")?;
            let state = app
                .transfers
                .mount(id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!(state))
        }
        "downloads.start" => {
            let item: ContentItem = params
                .get("item")
                .cloned()
                .ok_or("missing item")
                .and_then(|v| serde_json::from_value(v).map_err(|_| "invalid item"))?;
            let session = app.session_manager.require().map_err(|e| e.to_string())?;
            let outcome = app
                .transfers
                .start_download(&session, &item)
                .await
                .map_err(|e| alert(UserAlert::from(&e)))?;
            Ok(json!({"id": item.id, "outcome": outcome_name(outcome)}))
        }
        "downloads.cancel" => {
            let id = str_param(params, "id")?;
            app.transfers
                .cancel_download(id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "downloads.list" => {
            let report = app.reconciler.reconcile();
            let arr: Vec<Value> = report
                .records
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "title": r.title,
                        "file_path": r.file_path,
                        "file_name": r.file_name,
                        "type": r.kind,
                        "created_at": r.created_at,
                        "size_bytes": r.size_bytes,
                        "size_mb": bytes_to_display_mb(r.size_bytes),
                    })
                })
                .collect();
            Ok(json!(arr))
        }
        "downloads.delete" => {
            let id = str_param(params, "id")?;
            app.reconciler
                .delete_download(id)
                .map_err(|_| alert(UserAlert::deletion_failed()))?;
            Ok(json!({"ok": true}))
        }
        "downloads.storage" => {
            let report = app.reconciler.reconcile();
            let usage = app.quota().usage(report.total_bytes);
            Ok(json!({
                "total_bytes": report.total_bytes,
                "used_mb": usage.used_mb,
                "limit_mb": usage.limit_mb,
                "fraction": usage.fraction,
                "display": usage.display(),
            }))
        }

        // ─── Settings ───
        "settings.get" => {
            let engine = app.settings_engine();
            serde_json::to_value(engine.get_settings()).map_err(|e| Value::from(e.to_string()))
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.settings_engine()
                .set_value(key, value)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(Value::from(format!("unknown method: {}", method))),
    }
}

