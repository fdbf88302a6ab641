//! Session Manager.
//!
//! Persists the bearer token and user profile in the key-value store and
//! hands out explicit [`Session`] values. Nothing reads the session from a
//! global; callers pass it to whatever performs network calls.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::database::kv_store::{self, USER_INFO_KEY, USER_TOKEN_KEY};
use crate::database::Database;
use crate::types::errors::SessionError;
use crate::types::session::{Session, UserProfile};

/// Trait defining session management operations.
pub trait SessionManagerTrait {
    fn login(&self, token: &str, user: UserProfile) -> Result<Session, SessionError>;
    fn restore(&self) -> Option<Session>;
    fn require(&self) -> Result<Session, SessionError>;
    fn update_user_info(&self, patch: Map<String, Value>) -> Result<Session, SessionError>;
    fn logout(&self) -> Result<(), SessionError>;
}

/// Session manager backed by the key-value store.
pub struct SessionManager {
    db: Arc<Database>,
}

impl SessionManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl SessionManagerTrait for SessionManager {
    /// Stores the token and profile and returns the new session.
    fn login(&self, token: &str, user: UserProfile) -> Result<Session, SessionError> {
        let user_json = serde_json::to_string(&user)
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;
        let conn = self.db.connection();
        kv_store::set_item(&conn, USER_TOKEN_KEY, token)?;
        kv_store::set_item(&conn, USER_INFO_KEY, &user_json)?;
        info!("session stored");
        Ok(Session::new(token, user))
    }

    /// Loads the stored session. Missing or unreadable data means no session.
    fn restore(&self) -> Option<Session> {
        let conn = self.db.connection();
        let token = match kv_store::get_item(&conn, USER_TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read stored token");
                return None;
            }
        };
        let raw_user = match kv_store::get_item(&conn, USER_INFO_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read stored profile");
                return None;
            }
        };
        match serde_json::from_str::<UserProfile>(&raw_user) {
            Ok(user) => Some(Session::new(token, user)),
            Err(e) => {
                warn!(error = %e, "stored profile is corrupt");
                None
            }
        }
    }

    fn require(&self) -> Result<Session, SessionError> {
        self.restore().ok_or(SessionError::NotLoggedIn)
    }

    /// Merges `patch` into the stored profile, field by field.
    fn update_user_info(&self, patch: Map<String, Value>) -> Result<Session, SessionError> {
        let session = self.require()?;
        let mut merged = match serde_json::to_value(&session.user) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(SessionError::SerializationError(e.to_string())),
        };
        merged.extend(patch);

        let user: UserProfile = serde_json::from_value(Value::Object(merged))
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;
        let user_json = serde_json::to_string(&user)
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;
        self.db.set_item(USER_INFO_KEY, &user_json)?;
        Ok(Session::new(session.token, user))
    }

    /// Forgets the session. Download bookkeeping is left alone so files on
    /// disk stay accounted for.
    fn logout(&self) -> Result<(), SessionError> {
        let conn = self.db.connection();
        kv_store::remove_item(&conn, USER_TOKEN_KEY)?;
        kv_store::remove_item(&conn, USER_INFO_KEY)?;
        info!("session cleared");
        Ok(())
    }
}
