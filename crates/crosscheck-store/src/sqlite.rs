//! SQLite session store

use crate::StoreError;
use crosscheck_domain::traits::SessionStore;
use crosscheck_domain::{AgentFactCheckReport, AgentResult, ComparisonOutcome, Session, SessionId};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// SQLite-based implementation of `SessionStore`
///
/// List-valued records (agent results, reports) are replaced as a whole
/// inside one transaction, so a reload never sees a half-written list.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// store instance (or share one behind a lock).
pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    /// Open (or create) a session database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// In-memory database (tests)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    fn load_records<T: DeserializeOwned>(
        &self,
        sql: &str,
        session_id: SessionId,
    ) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(params![session_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        raw.iter()
            .map(|record| serde_json::from_str(record).map_err(StoreError::from))
            .collect()
    }
}

impl SessionStore for SqliteSessionStore {
    type Error = StoreError;

    fn save_session(&mut self, session: &Session) -> Result<(), Self::Error> {
        let record = serde_json::to_string(session)?;
        self.conn.execute(
            "INSERT INTO sessions (id, question, status, created_at, record)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
             status = excluded.status, record = excluded.record",
            params![
                session.id.to_string(),
                &session.question,
                session.status.as_str(),
                session.created_at.to_rfc3339(),
                record,
            ],
        )?;
        debug!(session = %session.id, status = %session.status, "Session saved");
        Ok(())
    }

    fn load_session(&self, id: SessionId) -> Result<Option<Session>, Self::Error> {
        let record: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM sessions WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(record.map(|r| serde_json::from_str(&r)).transpose()?)
    }

    fn save_agent_results(
        &mut self,
        session_id: SessionId,
        results: &[AgentResult],
    ) -> Result<(), Self::Error> {
        let id = session_id.to_string();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM agent_results WHERE session_id = ?1", params![&id])?;
        for (position, result) in results.iter().enumerate() {
            let status = if result.is_ok() { "ok" } else { "err" };
            tx.execute(
                "INSERT INTO agent_results (session_id, position, agent_id, status, record)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &id,
                    position as i64,
                    &result.agent_id,
                    status,
                    serde_json::to_string(result)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_agent_results(&self, session_id: SessionId) -> Result<Vec<AgentResult>, Self::Error> {
        self.load_records(
            "SELECT record FROM agent_results WHERE session_id = ?1 ORDER BY position",
            session_id,
        )
    }

    fn save_fact_check_reports(
        &mut self,
        session_id: SessionId,
        reports: &[AgentFactCheckReport],
    ) -> Result<(), Self::Error> {
        let id = session_id.to_string();
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM fact_check_reports WHERE session_id = ?1",
            params![&id],
        )?;
        for (position, report) in reports.iter().enumerate() {
            tx.execute(
                "INSERT INTO fact_check_reports (session_id, position, agent_id, overall_score, record)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &id,
                    position as i64,
                    &report.agent_id,
                    report.overall_score,
                    serde_json::to_string(report)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_fact_check_reports(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AgentFactCheckReport>, Self::Error> {
        self.load_records(
            "SELECT record FROM fact_check_reports WHERE session_id = ?1 ORDER BY position",
            session_id,
        )
    }

    fn save_comparison(
        &mut self,
        session_id: SessionId,
        comparison: &ComparisonOutcome,
    ) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO comparisons (session_id, available, record) VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id) DO UPDATE SET
             available = excluded.available, record = excluded.record",
            params![
                session_id.to_string(),
                comparison.available(),
                serde_json::to_string(comparison)?,
            ],
        )?;
        Ok(())
    }

    fn load_comparison(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ComparisonOutcome>, Self::Error> {
        let record: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM comparisons WHERE session_id = ?1",
                params![session_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(record.map(|r| serde_json::from_str(&r)).transpose()?)
    }
}
