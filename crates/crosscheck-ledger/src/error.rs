//! Error types for ledger operations

use thiserror::Error;

/// Errors that can occur during ledger operations
///
/// Every variant is fatal to the session that hit it: the audit trail's
/// integrity can no longer be vouched for.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A block's stored hash or linkage does not match its contents
    #[error("Hash mismatch at block {block_number}")]
    HashMismatch {
        /// First block that failed verification
        block_number: u64,
    },

    /// Another writer already committed (or skipped past) this block number
    #[error("Concurrent write conflict at block {block_number}")]
    ConcurrentWriteConflict {
        /// Block number that could not be committed
        block_number: u64,
    },

    /// Requested block is beyond the tip
    #[error("Block not found: {0}")]
    BlockNotFound(u64),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// Stable reason code
    pub fn reason_code(&self) -> &'static str {
        match self {
            LedgerError::HashMismatch { .. } => "hash_mismatch",
            LedgerError::ConcurrentWriteConflict { .. } => "concurrent_write_conflict",
            LedgerError::BlockNotFound(_) => "block_not_found",
            LedgerError::Storage(_) => "ledger_storage",
            LedgerError::Serialization(_) => "ledger_serialization",
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}
