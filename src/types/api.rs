//! Backend JSON contract.
//!
//! The backend is loose about numeric fields: sizes and ids arrive either as
//! JSON numbers or as numeric strings. The deserializers here absorb that at
//! the boundary so the rest of the crate only sees `u64` and `String`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use super::session::UserProfile;

/// Response of `GET /getDownloadRecording/{meetingId}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecordingLink {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub file_size: u64,
}

impl RecordingLink {
    /// The download URL, if the backend sent a non-blank one.
    pub fn usable_url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// Request body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Null,
}

/// Accepts `123`, `123.0`, `"123"` or `null`. Anything unparseable becomes 0.
pub fn de_u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Unsigned(n) => n,
        Loose::Signed(n) => n.max(0) as u64,
        Loose::Float(f) if f.is_finite() && f > 0.0 => f as u64,
        Loose::Float(_) => 0,
        Loose::Text(s) => parse_leading_u64(&s),
        Loose::Null => 0,
    })
}

/// Accepts a string or a number and yields its string form.
pub fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Loose::deserialize(deserializer)? {
        Loose::Unsigned(n) => Ok(n.to_string()),
        Loose::Signed(n) => Ok(n.to_string()),
        Loose::Float(f) => Ok(f.to_string()),
        Loose::Text(s) => Ok(s),
        Loose::Null => Err(de::Error::custom("expected a string or number, found null")),
    }
}

// Mirrors integer parsing of numeric strings: leading digits count, the rest is ignored.
fn parse_leading_u64(s: &str) -> u64 {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
