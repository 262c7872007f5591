//! Map-backed session store

use crate::StoreError;
use crosscheck_domain::traits::SessionStore;
use crosscheck_domain::{AgentFactCheckReport, AgentResult, ComparisonOutcome, Session, SessionId};
use std::collections::HashMap;

/// In-process session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<SessionId, Session>,
    agent_results: HashMap<SessionId, Vec<AgentResult>>,
    reports: HashMap<SessionId, Vec<AgentFactCheckReport>>,
    comparisons: HashMap<SessionId, ComparisonOutcome>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions held
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionStore for MemorySessionStore {
    type Error = StoreError;

    fn save_session(&mut self, session: &Session) -> Result<(), Self::Error> {
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    fn load_session(&self, id: SessionId) -> Result<Option<Session>, Self::Error> {
        Ok(self.sessions.get(&id).cloned())
    }

    fn save_agent_results(
        &mut self,
        session_id: SessionId,
        results: &[AgentResult],
    ) -> Result<(), Self::Error> {
        self.agent_results.insert(session_id, results.to_vec());
        Ok(())
    }

    fn load_agent_results(&self, session_id: SessionId) -> Result<Vec<AgentResult>, Self::Error> {
        Ok(self.agent_results.get(&session_id).cloned().unwrap_or_default())
    }

    fn save_fact_check_reports(
        &mut self,
        session_id: SessionId,
        reports: &[AgentFactCheckReport],
    ) -> Result<(), Self::Error> {
        self.reports.insert(session_id, reports.to_vec());
        Ok(())
    }

    fn load_fact_check_reports(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AgentFactCheckReport>, Self::Error> {
        Ok(self.reports.get(&session_id).cloned().unwrap_or_default())
    }

    fn save_comparison(
        &mut self,
        session_id: SessionId,
        comparison: &ComparisonOutcome,
    ) -> Result<(), Self::Error> {
        self.comparisons.insert(session_id, comparison.clone());
        Ok(())
    }

    fn load_comparison(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ComparisonOutcome>, Self::Error> {
        Ok(self.comparisons.get(&session_id).cloned())
    }
}
