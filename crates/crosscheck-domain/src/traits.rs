//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators. Implementations live in other crates (or in callers).

use crate::{
    AgentFactCheckReport, AgentResponse, AgentError, AgentResult, Claim, ComparisonOutcome,
    Corroboration, Session, SessionId, VerificationError,
};
use async_trait::async_trait;
use std::time::Duration;

/// Uniform interface wrapping exactly one external answer source
///
/// Adapters must not retry internally: retry policy belongs to the caller so
/// failure accounting stays in one place.
///
/// Implemented by the infrastructure layer (crosscheck-agents)
#[async_trait]
pub trait AgentAdapter: Send + Sync {
    /// Configured identifier of this agent
    fn id(&self) -> &str;

    /// Ask the agent a question, giving up after `timeout`
    async fn invoke(&self, question: &str, timeout: Duration)
        -> Result<AgentResponse, AgentError>;
}

/// Turns an answer into atomic claims
///
/// Sentences with no claim-bearing pattern are dropped, never reported as errors.
///
/// Implemented by the application layer (crosscheck-factcheck)
pub trait ClaimExtractor: Send + Sync {
    /// Extract claims from `text`, attributing them to `source_agent_id`
    fn extract_claims(&self, text: &str, source_agent_id: &str) -> Vec<Claim>;
}

/// External search / fact-check lookup for a single claim
#[async_trait]
pub trait VerificationBackend: Send + Sync {
    /// Look up corroborating sources for `claim_text`
    async fn verify(&self, claim_text: &str) -> Result<Corroboration, VerificationError>;
}

/// Scores the bias of an answer on a 0-10 scale
pub trait BiasScorer: Send + Sync {
    /// `None` when the text cannot be scored
    fn score(&self, text: &str) -> Option<f64>;
}

/// Durable storage for session records
///
/// A write must be durable before the orchestrator reports the matching
/// state transition as committed.
///
/// Implemented by the infrastructure layer (crosscheck-store)
pub trait SessionStore {
    /// Error type for store operations
    type Error;

    /// Insert or replace a session
    fn save_session(&mut self, session: &Session) -> Result<(), Self::Error>;

    /// Get a session by ID
    fn load_session(&self, id: SessionId) -> Result<Option<Session>, Self::Error>;

    /// Store the settled agent results of a session
    fn save_agent_results(
        &mut self,
        session_id: SessionId,
        results: &[AgentResult],
    ) -> Result<(), Self::Error>;

    /// Get the agent results of a session (empty if none were saved)
    fn load_agent_results(&self, session_id: SessionId) -> Result<Vec<AgentResult>, Self::Error>;

    /// Store the per-agent fact-check reports of a session
    fn save_fact_check_reports(
        &mut self,
        session_id: SessionId,
        reports: &[AgentFactCheckReport],
    ) -> Result<(), Self::Error>;

    /// Get the per-agent fact-check reports of a session
    fn load_fact_check_reports(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AgentFactCheckReport>, Self::Error>;

    /// Store the comparison outcome of a session
    fn save_comparison(
        &mut self,
        session_id: SessionId,
        comparison: &ComparisonOutcome,
    ) -> Result<(), Self::Error>;

    /// Get the comparison outcome of a session
    fn load_comparison(&self, session_id: SessionId)
        -> Result<Option<ComparisonOutcome>, Self::Error>;
}
