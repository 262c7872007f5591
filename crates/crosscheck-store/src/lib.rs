//! Crosscheck Session Storage
//!
//! Implements the `SessionStore` trait twice: a map-backed store for tests
//! and single-process use, and a SQLite store for durable history.
//!
//! # Examples
//!
//! ```
//! use crosscheck_domain::Session;
//! use crosscheck_domain::traits::SessionStore;
//! use crosscheck_store::SqliteSessionStore;
//!
//! let mut store = SqliteSessionStore::in_memory().unwrap();
//! let session = Session::new("When was the Eiffel Tower completed?");
//! store.save_session(&session).unwrap();
//! assert!(store.load_session(session.id).unwrap().is_some());
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored record could not be encoded or decoded
    #[error("Invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

impl StoreError {
    /// Stable reason code
    pub fn reason_code(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "store_database",
            StoreError::InvalidData(_) => "store_invalid_data",
        }
    }
}
