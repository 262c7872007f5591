//! Hash chain: block numbering, hashing, linkage and verification

use crate::{LedgerError, LedgerStore};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use crosscheck_domain::LedgerBlock;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// `previous_hash` of block 0
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Compute a block hash
///
/// `SHA-256(canonical(payload) ‖ previous_hash ‖ block_number)`, hex encoded.
/// The hashed payload is an envelope holding the event metadata next to the
/// free-form data, so rewriting the event type, session or timestamp breaks
/// the chain exactly like rewriting the data does. `serde_json` maps are
/// key-sorted, which makes the serialization canonical.
pub fn compute_hash(
    block_number: u64,
    previous_hash: &str,
    event_type: &str,
    session_id: &str,
    timestamp: &DateTime<Utc>,
    payload: &Value,
) -> Result<String, LedgerError> {
    let envelope = json!({
        "data": payload,
        "event_type": event_type,
        "session_id": session_id,
        "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
    });
    let canonical = serde_json::to_string(&envelope)?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(previous_hash.as_bytes());
    hasher.update(block_number.to_string().as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn recompute(block: &LedgerBlock) -> Result<String, LedgerError> {
    compute_hash(
        block.block_number,
        &block.previous_hash,
        &block.event_type,
        &block.session_id,
        &block.timestamp,
        &block.payload,
    )
}

/// The append-only ledger
///
/// # Thread Safety
///
/// `append` holds the store lock for the whole read-tip / hash / persist
/// sequence, so appends on one chain are strictly serialized. `append` is
/// synchronous: once called it runs to completion, which keeps task
/// cancellation from ever leaving a half-written block.
pub struct Ledger<S: LedgerStore> {
    store: Mutex<S>,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a ledger over a store (which may already hold blocks)
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>, LedgerError> {
        self.store
            .lock()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".to_string()))
    }

    /// Append a block for `event_type` and return it once it is persisted
    pub fn append(
        &self,
        event_type: &str,
        session_id: &str,
        payload: Value,
    ) -> Result<LedgerBlock, LedgerError> {
        let mut store = self.lock()?;

        let (block_number, previous_hash) = match store.tip()? {
            Some(tip) => (tip.block_number + 1, tip.current_hash),
            None => (0, GENESIS_HASH.to_string()),
        };
        let timestamp = Utc::now().trunc_subsecs(6);
        let current_hash = compute_hash(
            block_number,
            &previous_hash,
            event_type,
            session_id,
            &timestamp,
            &payload,
        )?;

        let block = LedgerBlock {
            block_number,
            previous_hash,
            current_hash,
            timestamp,
            event_type: event_type.to_string(),
            session_id: session_id.to_string(),
            payload,
        };
        store.append(&block)?;

        info!(
            block = block.block_number,
            event = %block.event_type,
            session = %block.session_id,
            "Ledger block appended"
        );
        Ok(block)
    }

    /// Verify hashes and linkage for blocks `from..=to`
    ///
    /// `to` is clamped to the tip. Returns the first offending block on failure.
    pub fn verify_chain_detailed(&self, from: u64, to: u64) -> Result<(), LedgerError> {
        let store = self.lock()?;
        let len = store.len()?;
        if len == 0 && from == 0 {
            return Ok(());
        }
        if from >= len || from > to {
            return Err(LedgerError::BlockNotFound(from));
        }
        let to = to.min(len - 1);

        let mut expected_previous = if from == 0 {
            GENESIS_HASH.to_string()
        } else {
            store
                .get(from - 1)?
                .ok_or(LedgerError::BlockNotFound(from - 1))?
                .current_hash
        };

        let blocks = store.range(from, to)?;
        let mut expected_number = from;
        for block in &blocks {
            if block.block_number != expected_number || block.previous_hash != expected_previous {
                return Err(LedgerError::HashMismatch {
                    block_number: expected_number,
                });
            }
            if recompute(block)? != block.current_hash {
                return Err(LedgerError::HashMismatch {
                    block_number: block.block_number,
                });
            }
            expected_previous = block.current_hash.clone();
            expected_number += 1;
        }
        if expected_number != to + 1 {
            return Err(LedgerError::BlockNotFound(expected_number));
        }

        debug!(from, to, "Ledger range verified");
        Ok(())
    }

    /// Verify hashes and linkage for blocks `from..=to`
    pub fn verify_chain(&self, from: u64, to: u64) -> bool {
        match self.verify_chain_detailed(from, to) {
            Ok(()) => true,
            Err(e) => {
                warn!(from, to, error = %e, "Ledger verification failed");
                false
            }
        }
    }

    /// Get a block by number
    pub fn get(&self, block_number: u64) -> Result<Option<LedgerBlock>, LedgerError> {
        self.lock()?.get(block_number)
    }

    /// Blocks `from..=to`
    pub fn blocks(&self, from: u64, to: u64) -> Result<Vec<LedgerBlock>, LedgerError> {
        self.lock()?.range(from, to)
    }

    /// All blocks written for one session
    pub fn session_blocks(&self, session_id: &str) -> Result<Vec<LedgerBlock>, LedgerError> {
        let store = self.lock()?;
        match store.len()? {
            0 => Ok(Vec::new()),
            len => Ok(store
                .range(0, len - 1)?
                .into_iter()
                .filter(|b| b.session_id == session_id)
                .collect()),
        }
    }

    /// Number of blocks in the chain
    pub fn len(&self) -> Result<u64, LedgerError> {
        self.lock()?.len()
    }

    /// Whether the chain has no blocks
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::MemoryLedgerStore;
    use proptest::prelude::*;

    proptest! {
        /// Property: any appended sequence verifies end to end
        #[test]
        fn test_appended_chain_always_verifies(payloads in proptest::collection::vec(".{0,40}", 1..30)) {
            let ledger = Ledger::new(MemoryLedgerStore::new());
            for p in &payloads {
                ledger.append("responses_collected", "s", json!({ "text": p })).unwrap();
            }
            let last = payloads.len() as u64 - 1;
            prop_assert!(ledger.verify_chain(0, last));
        }

        /// Property: changing any one payload breaks verification at that block
        #[test]
        fn test_any_tampered_payload_is_detected(len in 2u64..20, pick in 0u64..20) {
            let target = pick % len;
            let ledger = Ledger::new(MemoryLedgerStore::new());
            for i in 0..len {
                ledger.append("responses_collected", "s", json!({ "i": i })).unwrap();
            }
            ledger.lock().unwrap().overwrite_payload(target, json!({ "i": "tampered" }));

            let result = ledger.verify_chain_detailed(0, len - 1);
            let attributed = matches!(
                result,
                Err(LedgerError::HashMismatch { block_number }) if block_number == target
            );
            prop_assert!(attributed);
        }
    }
}
