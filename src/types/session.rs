use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the signed-in student as returned by the backend.
///
/// Only the fields this crate reads are typed; everything else the backend
/// sends is kept in `extra` so profile updates round-trip without loss.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An authenticated session. Passed explicitly to every operation that
/// talks to the backend.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}
