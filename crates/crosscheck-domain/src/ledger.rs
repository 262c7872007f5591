//! Ledger block record
//!
//! The chain itself (hashing, linkage, storage) lives in `crosscheck-ledger`.
//! This module only defines the persisted layout so that readers of the
//! audit trail do not need the ledger crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline events recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// All agents settled and their results were persisted
    ResponsesCollected,
    /// Fact-checking and aggregation finished
    PipelineCompleted,
    /// The session's block range verified cleanly
    Verified,
    /// The session failed
    Error,
}

impl EventType {
    /// Event name as written into the block
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ResponsesCollected => "responses_collected",
            EventType::PipelineCompleted => "pipeline_completed",
            EventType::Verified => "verified",
            EventType::Error => "error",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One write-once, hash-linked audit record
///
/// `current_hash` covers the payload, the previous hash and the block number;
/// `previous_hash` of block *n* equals `current_hash` of block *n - 1*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerBlock {
    /// Sequential index, starting at 0
    pub block_number: u64,

    /// Hex SHA-256 of the previous block (genesis constant for block 0)
    pub previous_hash: String,

    /// Hex SHA-256 of this block
    pub current_hash: String,

    /// When the block was appended
    pub timestamp: DateTime<Utc>,

    /// Event name (see [`EventType`])
    pub event_type: String,

    /// Session that triggered the event
    pub session_id: String,

    /// Free-form event metadata
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        assert_eq!(EventType::ResponsesCollected.as_str(), "responses_collected");
        assert_eq!(EventType::PipelineCompleted.to_string(), "pipeline_completed");
        assert_eq!(
            serde_json::to_string(&EventType::Verified).unwrap(),
            "\"verified\""
        );
    }
}
