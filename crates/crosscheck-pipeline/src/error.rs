//! Error types for session orchestration

use crate::config::ConfigError;
use crosscheck_domain::TransitionError;
use crosscheck_factcheck::FactCheckError;
use crosscheck_ledger::LedgerError;
use thiserror::Error;

/// Unrecoverable session failures
///
/// Per-agent and per-claim failures never show up here; they are data in
/// the results and reports. Anything that does reach this type moves the
/// session to `error`.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Ledger integrity or storage failure
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Session store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Illegal session state transition
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Fact-checking could not run
    #[error("Fact-check error: {0}")]
    FactCheck(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session was cancelled
    #[error("Session cancelled")]
    Cancelled,
}

impl From<FactCheckError> for PipelineError {
    fn from(e: FactCheckError) -> Self {
        match e {
            FactCheckError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::FactCheck(other.to_string()),
        }
    }
}

impl PipelineError {
    /// Stable reason code written into the session's error log
    pub fn reason_code(&self) -> &'static str {
        match self {
            PipelineError::Ledger(e) => e.reason_code(),
            PipelineError::Store(_) => "store_failure",
            PipelineError::Transition(_) => "invalid_transition",
            PipelineError::FactCheck(_) => "fact_check_failure",
            PipelineError::Config(_) => "invalid_config",
            PipelineError::Cancelled => "cancelled",
        }
    }

    /// Whether the ledger itself failed
    pub fn is_ledger_failure(&self) -> bool {
        matches!(self, PipelineError::Ledger(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let e = PipelineError::from(LedgerError::HashMismatch { block_number: 5 });
        assert_eq!(e.reason_code(), "hash_mismatch");
        assert!(e.is_ledger_failure());

        let e = PipelineError::from(FactCheckError::Cancelled);
        assert_eq!(e.reason_code(), "cancelled");
        assert!(!e.is_ledger_failure());

        assert_eq!(PipelineError::Store("disk full".into()).reason_code(), "store_failure");
    }
}
