//! SQLite ledger store

use crate::{LedgerError, LedgerStore};
use chrono::{DateTime, SecondsFormat, Utc};
use crosscheck_domain::LedgerBlock;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

/// Durable ledger store
///
/// Runs in WAL mode with `synchronous = FULL`, so a block is on disk by the
/// time `append` returns. The primary key on `block_number` turns a second
/// writer racing for the same index into
/// [`LedgerError::ConcurrentWriteConflict`].
pub struct SqliteLedgerStore {
    conn: Connection,
}

impl SqliteLedgerStore {
    /// Open (or create) a ledger database at `path`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crosscheck_ledger::SqliteLedgerStore;
    ///
    /// let store = SqliteLedgerStore::open("ledger.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// In-memory database (tests)
    pub fn in_memory() -> Result<Self, LedgerError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self, LedgerError> {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    fn row_to_block(row: &Row<'_>) -> rusqlite::Result<(LedgerBlock, String)> {
        let timestamp: String = row.get(3)?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?
            .with_timezone(&Utc);

        let block = LedgerBlock {
            block_number: row.get::<_, i64>(0)? as u64,
            previous_hash: row.get(1)?,
            current_hash: row.get(2)?,
            timestamp,
            event_type: row.get(4)?,
            session_id: row.get(5)?,
            payload: serde_json::Value::Null,
        };
        Ok((block, row.get(6)?))
    }

    fn with_payload((mut block, payload): (LedgerBlock, String)) -> Result<LedgerBlock, LedgerError> {
        block.payload = serde_json::from_str(&payload)?;
        Ok(block)
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn append(&mut self, block: &LedgerBlock) -> Result<(), LedgerError> {
        let conflict = LedgerError::ConcurrentWriteConflict {
            block_number: block.block_number,
        };
        if block.block_number != self.len()? {
            return Err(conflict);
        }

        let payload = serde_json::to_string(&block.payload)?;
        let inserted = self.conn.execute(
            "INSERT INTO ledger_blocks
             (block_number, previous_hash, current_hash, timestamp, event_type, session_id, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                block.block_number as i64,
                &block.previous_hash,
                &block.current_hash,
                block.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                &block.event_type,
                &block.session_id,
                payload,
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(conflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, block_number: u64) -> Result<Option<LedgerBlock>, LedgerError> {
        let raw = self
            .conn
            .query_row(
                "SELECT block_number, previous_hash, current_hash, timestamp, event_type, session_id, payload
                 FROM ledger_blocks WHERE block_number = ?1",
                params![block_number as i64],
                Self::row_to_block,
            )
            .optional()?;
        raw.map(Self::with_payload).transpose()
    }

    fn range(&self, from: u64, to: u64) -> Result<Vec<LedgerBlock>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT block_number, previous_hash, current_hash, timestamp, event_type, session_id, payload
             FROM ledger_blocks WHERE block_number >= ?1 AND block_number <= ?2
             ORDER BY block_number",
        )?;
        let rows = stmt
            .query_map(
                params![from as i64, to.min(i64::MAX as u64) as i64],
                Self::row_to_block,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(Self::with_payload).collect()
    }

    fn len(&self) -> Result<u64, LedgerError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ledger_blocks", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(n: u64) -> LedgerBlock {
        LedgerBlock {
            block_number: n,
            previous_hash: "p".to_string(),
            current_hash: format!("h{}", n),
            timestamp: Utc::now(),
            event_type: "responses_collected".to_string(),
            session_id: "s".to_string(),
            payload: json!({ "score": 6.666666666666667, "agents": ["a", "b"] }),
        }
    }

    #[test]
    fn test_store_initialization() {
        let store = SqliteLedgerStore::in_memory();
        assert!(store.is_ok(), "Store should initialize successfully");
        assert!(store.unwrap().is_empty().unwrap());
    }

    #[test]
    fn test_append_and_get_round_trip() {
        let mut store = SqliteLedgerStore::in_memory().unwrap();
        let original = block(0);
        store.append(&original).unwrap();

        let loaded = store.get(0).unwrap().expect("block 0 stored");
        assert_eq!(loaded.current_hash, "h0");
        assert_eq!(loaded.payload, original.payload);
        assert_eq!(
            loaded.timestamp.timestamp_micros(),
            original.timestamp.timestamp_micros()
        );
    }

    #[test]
    fn test_rejects_duplicate_block_number() {
        let mut store = SqliteLedgerStore::in_memory().unwrap();
        store.append(&block(0)).unwrap();
        assert!(matches!(
            store.append(&block(0)),
            Err(LedgerError::ConcurrentWriteConflict { block_number: 0 })
        ));
    }

    #[test]
    fn test_range_orders_by_block_number() {
        let mut store = SqliteLedgerStore::in_memory().unwrap();
        for n in 0..4 {
            store.append(&block(n)).unwrap();
        }
        let numbers: Vec<u64> = store
            .range(1, u64::MAX)
            .unwrap()
            .iter()
            .map(|b| b.block_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
