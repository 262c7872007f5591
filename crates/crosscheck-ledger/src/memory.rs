//! In-memory ledger store

use crate::{LedgerError, LedgerStore};
use crosscheck_domain::LedgerBlock;

/// Vec-backed block arena; index == block number
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    blocks: Vec<LedgerBlock>,
}

impl MemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn overwrite_payload(&mut self, block_number: u64, payload: serde_json::Value) {
        self.blocks[block_number as usize].payload = payload;
    }

    #[cfg(test)]
    pub(crate) fn overwrite_event_type(&mut self, block_number: u64, event_type: &str) {
        self.blocks[block_number as usize].event_type = event_type.to_string();
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn append(&mut self, block: &LedgerBlock) -> Result<(), LedgerError> {
        if block.block_number != self.blocks.len() as u64 {
            return Err(LedgerError::ConcurrentWriteConflict {
                block_number: block.block_number,
            });
        }
        self.blocks.push(block.clone());
        Ok(())
    }

    fn get(&self, block_number: u64) -> Result<Option<LedgerBlock>, LedgerError> {
        Ok(usize::try_from(block_number)
            .ok()
            .and_then(|i| self.blocks.get(i))
            .cloned())
    }

    fn range(&self, from: u64, to: u64) -> Result<Vec<LedgerBlock>, LedgerError> {
        Ok(self
            .blocks
            .iter()
            .filter(|b| b.block_number >= from && b.block_number <= to)
            .cloned()
            .collect())
    }

    fn len(&self) -> Result<u64, LedgerError> {
        Ok(self.blocks.len() as u64)
    }
}
