//! Session orchestration
//!
//! Drives one question through dispatch, fact-checking and aggregation,
//! persisting each stage and recording it in the ledger before the session
//! advances.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::quality::compute_quality;
use crosscheck_aggregate::{compare_reports, AggregationThresholds};
use crosscheck_dispatch::{CancellationToken, Dispatcher, RateLimiter};
use crosscheck_domain::traits::SessionStore;
use crosscheck_domain::{
    AgentFactCheckReport, AgentResult, ComparisonOutcome, EventType, Session,
    SessionErrorEntry, SessionStatus,
};
use crosscheck_factcheck::{FactChecker, PatternClaimExtractor};
use crosscheck_ledger::{Ledger, LedgerStore};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

/// Everything a session produced, including partial results on failure
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    /// Final session state, status log and error log
    pub session: Session,

    /// One result per configured agent (empty if dispatch never ran)
    pub agent_results: Vec<AgentResult>,

    /// One report per answering agent
    pub reports: Vec<AgentFactCheckReport>,

    /// Cross-agent comparison, once computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonOutcome>,
}

impl SessionOutcome {
    fn new(session: Session) -> Self {
        Self {
            session,
            agent_results: Vec::new(),
            reports: Vec::new(),
            comparison: None,
        }
    }

    /// Whether the session reached `ledger_verified`
    pub fn succeeded(&self) -> bool {
        self.session.status == SessionStatus::LedgerVerified
    }

    /// The failure that ended the session, if any
    pub fn error(&self) -> Option<&SessionErrorEntry> {
        self.session.error_log.last()
    }
}

/// Runs sessions against a shared ledger and session store
///
/// One orchestrator serves any number of concurrent sessions: the ledger
/// serializes appends and the store sits behind a mutex that is never held
/// across an await point.
pub struct Orchestrator<L: LedgerStore, S: SessionStore> {
    dispatcher: Dispatcher,
    fact_checker: FactChecker,
    thresholds: AggregationThresholds,
    ledger: Arc<Ledger<L>>,
    store: Mutex<S>,
}

impl<L, S> Orchestrator<L, S>
where
    L: LedgerStore,
    S: SessionStore + Send,
    S::Error: Display,
{
    /// Create an orchestrator from its parts
    pub fn new(
        dispatcher: Dispatcher,
        fact_checker: FactChecker,
        thresholds: AggregationThresholds,
        ledger: Arc<Ledger<L>>,
        store: S,
    ) -> Self {
        Self {
            dispatcher,
            fact_checker,
            thresholds,
            ledger,
            store: Mutex::new(store),
        }
    }

    /// Build agents, verification backend and stages from configuration
    pub fn from_config(
        config: &PipelineConfig,
        ledger: Arc<Ledger<L>>,
        store: S,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let mut dispatcher = Dispatcher::new(config.build_agents(), config.dispatch.clone());
        if let Some(interval) = config.dispatch.min_call_interval() {
            dispatcher = dispatcher.with_rate_limiter(Arc::new(RateLimiter::new(interval)));
        }

        let extractor = PatternClaimExtractor::new(&config.factcheck)?;
        let fact_checker = FactChecker::new(
            Arc::new(extractor),
            config.build_backend(),
            config.factcheck.clone(),
        );

        Ok(Self::new(
            dispatcher,
            fact_checker,
            config.aggregation.clone(),
            ledger,
            store,
        ))
    }

    /// The shared ledger
    pub fn ledger(&self) -> &Arc<Ledger<L>> {
        &self.ledger
    }

    /// Lock the session store
    pub fn store(&self) -> MutexGuard<'_, S> {
        // A panic mid-save leaves at most one stale record
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run one question to a terminal state
    pub async fn run(&self, question: &str) -> SessionOutcome {
        self.run_with_cancel(question, &CancellationToken::new()).await
    }

    /// Run one question, stopping pending agent calls and verifications
    /// when `cancel` fires
    ///
    /// Never returns an error: failures end the session in `error` and the
    /// outcome keeps whatever was computed before.
    pub async fn run_with_cancel(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> SessionOutcome {
        let mut outcome = SessionOutcome::new(Session::new(question));
        info!(session = %outcome.session.id, "Session received");

        if let Err(e) = self.drive(&mut outcome, cancel).await {
            self.fail(&mut outcome, e);
        }
        outcome
    }

    async fn drive(
        &self,
        outcome: &mut SessionOutcome,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        self.save(|s| s.save_session(&outcome.session))?;
        self.advance(&mut outcome.session, SessionStatus::Processing, "dispatching agents")?;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let results = self
            .dispatcher
            .dispatch(&outcome.session.question, cancel)
            .await;
        outcome.agent_results = results;
        let session_id = outcome.session.id;
        self.save(|s| s.save_agent_results(session_id, &outcome.agent_results))?;
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let first_block = self.append(
            &mut outcome.session,
            EventType::ResponsesCollected,
            responses_payload(&outcome.agent_results),
        )?;
        self.advance(
            &mut outcome.session,
            SessionStatus::ResponsesSaved,
            "agent results persisted",
        )?;

        let checked = self
            .fact_checker
            .check_results(&outcome.agent_results, cancel, &mut outcome.reports)
            .await;
        // Reports finished before a cancellation are kept
        self.save(|s| s.save_fact_check_reports(session_id, &outcome.reports))?;
        checked?;

        let comparison = compare_reports(&outcome.reports, &self.thresholds);
        self.save(|s| s.save_comparison(session_id, &comparison))?;
        let metrics = compute_quality(&outcome.agent_results, &outcome.reports, &comparison);
        let summary = comparison_summary(&comparison);
        outcome.comparison = Some(comparison);

        let last_block =
            self.append(&mut outcome.session, EventType::PipelineCompleted, summary)?;
        self.advance(
            &mut outcome.session,
            SessionStatus::PipelineComplete,
            "fact-check and comparison recorded",
        )?;

        outcome.session.complete(metrics)?;
        self.save(|s| s.save_session(&outcome.session))?;

        self.ledger.verify_chain_detailed(first_block, last_block)?;
        self.append(
            &mut outcome.session,
            EventType::Verified,
            json!({ "from_block": first_block, "to_block": last_block }),
        )?;
        self.advance(
            &mut outcome.session,
            SessionStatus::LedgerVerified,
            format!("ledger blocks {}..={} verified", first_block, last_block),
        )?;

        info!(session = %outcome.session.id, "Session verified");
        Ok(())
    }

    /// Transition and persist; the transition counts once the save succeeds
    fn advance(
        &self,
        session: &mut Session,
        to: SessionStatus,
        message: impl Into<String>,
    ) -> Result<(), PipelineError> {
        session.transition(to, message)?;
        self.save(|s| s.save_session(&*session))?;
        info!(session = %session.id, status = to.as_str(), "Session advanced");
        Ok(())
    }

    /// Append a block for `session`, returning its number
    fn append(
        &self,
        session: &mut Session,
        event: EventType,
        payload: Value,
    ) -> Result<u64, PipelineError> {
        let block = self
            .ledger
            .append(event.as_str(), &session.id.to_string(), payload)?;
        session.record_block(block.block_number);
        Ok(block.block_number)
    }

    fn save<F>(&self, f: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&mut S) -> Result<(), S::Error>,
    {
        f(&mut self.store()).map_err(|e| PipelineError::Store(e.to_string()))
    }

    fn fail(&self, outcome: &mut SessionOutcome, e: PipelineError) {
        let session = &mut outcome.session;
        let from = session.status;
        error!(
            session = %session.id,
            status = from.as_str(),
            reason = e.reason_code(),
            error = %e,
            "Session failed"
        );

        if let Err(te) = session.fail(e.reason_code(), e.to_string()) {
            warn!(session = %session.id, error = %te, "Session already terminal");
            return;
        }

        if e.is_ledger_failure() {
            warn!(session = %session.id, "Skipping error block: the ledger itself failed");
        } else {
            let payload = json!({
                "reason_code": e.reason_code(),
                "message": e.to_string(),
                "failed_in": from.as_str(),
            });
            if let Err(le) = self.append(session, EventType::Error, payload) {
                warn!(session = %session.id, error = %le, "Failed to record error block");
            }
        }

        if let Err(se) = self.save(|s| s.save_session(&*session)) {
            warn!(session = %session.id, error = %se, "Failed to persist failed session");
        }
    }
}

fn responses_payload(results: &[AgentResult]) -> Value {
    let answered = results.iter().filter(|r| r.is_ok()).count();
    let agents: Vec<Value> = results
        .iter()
        .map(|r| match (r.response(), r.error()) {
            (Some(response), _) => json!({
                "agent_id": r.agent_id,
                "status": "ok",
                "latency_ms": response.latency_ms,
                "token_count": response.token_count,
            }),
            (None, Some(error)) => json!({
                "agent_id": r.agent_id,
                "status": "error",
                "reason_code": error.kind.as_str(),
            }),
            (None, None) => json!({ "agent_id": r.agent_id }),
        })
        .collect();
    json!({
        "agent_count": results.len(),
        "answered": answered,
        "failed": results.len() - answered,
        "agents": agents,
    })
}

fn comparison_summary(comparison: &ComparisonOutcome) -> Value {
    match comparison {
        ComparisonOutcome::Available(report) => json!({
            "available": true,
            "best_agent": report.best_agent,
            "worst_agent": report.worst_agent,
            "average_score": report.average_score,
            "total_claims": report.total_claims,
            "total_verified": report.total_verified,
            "uncertainty_rate": report.uncertainty_rate,
            "neutral_count": report.neutral_count,
        }),
        ComparisonOutcome::Unavailable { message } => json!({
            "available": false,
            "message": message,
        }),
    }
}
