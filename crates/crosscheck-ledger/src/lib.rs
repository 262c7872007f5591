//! Crosscheck Provenance Ledger
//!
//! Append-only, hash-chained record of every pipeline event.
//!
//! # Architecture
//!
//! - [`Ledger`] owns the chain logic: block numbering, hashing, linkage and
//!   verification. Appends are serialized behind a mutex so concurrent
//!   sessions never receive the same block number or link to a stale tail.
//! - [`LedgerStore`] is the arena the blocks live in, indexed by block
//!   number. "Previous" is always a lookup at `n - 1`, never a pointer.
//! - Two stores ship with the crate: [`MemoryLedgerStore`] and the durable
//!   [`SqliteLedgerStore`].
//!
//! There is no update or delete operation.
//!
//! # Examples
//!
//! ```
//! use crosscheck_ledger::{Ledger, MemoryLedgerStore};
//! use serde_json::json;
//!
//! let ledger = Ledger::new(MemoryLedgerStore::new());
//! let block = ledger.append("responses_collected", "session-1", json!({"agents": 3})).unwrap();
//! assert_eq!(block.block_number, 0);
//! assert!(ledger.verify_chain(0, 0));
//! ```

#![warn(missing_docs)]

mod chain;
mod error;
mod memory;
mod sqlite;

pub use chain::{compute_hash, Ledger, GENESIS_HASH};
pub use error::LedgerError;
pub use memory::MemoryLedgerStore;
pub use sqlite::SqliteLedgerStore;

use crosscheck_domain::LedgerBlock;

/// Storage arena for ledger blocks
///
/// Implementations must reject a block whose number is not exactly the
/// current length with [`LedgerError::ConcurrentWriteConflict`], and must
/// have durably written the block before `append` returns `Ok`.
pub trait LedgerStore: Send {
    /// Persist the next block
    fn append(&mut self, block: &LedgerBlock) -> Result<(), LedgerError>;

    /// Get a block by number
    fn get(&self, block_number: u64) -> Result<Option<LedgerBlock>, LedgerError>;

    /// Blocks with `from <= block_number <= to`, in order
    fn range(&self, from: u64, to: u64) -> Result<Vec<LedgerBlock>, LedgerError>;

    /// Number of blocks stored
    fn len(&self) -> Result<u64, LedgerError>;

    /// Whether the store holds no blocks
    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// The last block, if any
    fn tip(&self) -> Result<Option<LedgerBlock>, LedgerError> {
        match self.len()? {
            0 => Ok(None),
            n => self.get(n - 1),
        }
    }
}
