//! Persisted key-value store.
//!
//! Provides SQLite connection management, schema migrations and string
//! key-value access.
//!
//! # Usage
//!
//! ```no_run
//! use classroom_offline::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("offline.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! db.set_item("userToken", "abc").expect("write failed");
//! assert_eq!(db.get_item("userToken").unwrap().as_deref(), Some("abc"));
//! ```

pub mod connection;
pub mod kv_store;
pub mod migrations;

pub use connection::Database;
