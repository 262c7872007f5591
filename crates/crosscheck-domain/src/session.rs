//! Session module - one question lifecycle and its state machine
//!
//! ```text
//! received → processing → responses_saved → pipeline_complete → completed → ledger_verified
//!     └──────────┴──────────────┴─────────────────┴──────────────┴──→ error
//! ```
//!
//! `ledger_verified` and `error` are terminal. The status log is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a session based on UUIDv7
///
/// UUIDv7 keeps session identifiers chronologically sortable, which makes
/// ledger ranges and stored sessions list in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    /// Generate a new UUIDv7-based SessionId
    ///
    /// # Examples
    ///
    /// ```
    /// use crosscheck_domain::SessionId;
    ///
    /// let id = SessionId::new();
    /// assert_eq!(id.to_string().len(), 36);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create a SessionId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(uuid::Uuid::from_u128(value))
    }

    /// Parse a SessionId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid session id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0.as_u128()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Question accepted, nothing started
    Received,
    /// Agents are being dispatched
    Processing,
    /// Agent results persisted and recorded in the ledger
    ResponsesSaved,
    /// Fact-checking and aggregation recorded in the ledger
    PipelineComplete,
    /// Quality metrics attached
    Completed,
    /// The session's ledger range verified (terminal)
    LedgerVerified,
    /// Unrecoverable failure (terminal)
    Error,
}

impl SessionStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Received => "received",
            SessionStatus::Processing => "processing",
            SessionStatus::ResponsesSaved => "responses_saved",
            SessionStatus::PipelineComplete => "pipeline_complete",
            SessionStatus::Completed => "completed",
            SessionStatus::LedgerVerified => "ledger_verified",
            SessionStatus::Error => "error",
        }
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::LedgerVerified | SessionStatus::Error)
    }

    /// The single forward successor on the happy path
    pub fn next(&self) -> Option<Self> {
        match self {
            SessionStatus::Received => Some(SessionStatus::Processing),
            SessionStatus::Processing => Some(SessionStatus::ResponsesSaved),
            SessionStatus::ResponsesSaved => Some(SessionStatus::PipelineComplete),
            SessionStatus::PipelineComplete => Some(SessionStatus::Completed),
            SessionStatus::Completed => Some(SessionStatus::LedgerVerified),
            SessionStatus::LedgerVerified | SessionStatus::Error => None,
        }
    }

    /// Whether `self → to` is a legal transition
    pub fn can_transition_to(&self, to: SessionStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == SessionStatus::Error || self.next() == Some(to)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Illegal state machine transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `from → to` is not an edge of the state machine
    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: SessionStatus,
        /// Requested status
        to: SessionStatus,
    },
}

/// One entry of the append-only status log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Status entered
    pub status: SessionStatus,
    /// When it was entered
    pub timestamp: DateTime<Utc>,
    /// Why
    pub message: String,
}

/// One entry of the session error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionErrorEntry {
    /// When the failure happened
    pub timestamp: DateTime<Utc>,
    /// Human-readable detail
    pub message: String,
    /// Stable reason code (e.g. `hash_mismatch`, `cancelled`)
    pub reason_code: String,
}

/// Categorical severity of a session's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Answers are well corroborated and most agents responded
    Low,
    /// Noticeable uncertainty or agent failures
    Medium,
    /// Most claims unverified or most agents failed
    High,
}

/// Final quality metrics attached when a session completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean claim confidence normalized to [0.0, 1.0]
    pub confidence: f64,
    /// Agreement between agent scores in [0.0, 1.0]
    pub consensus: f64,
    /// Outcome severity
    pub severity: Severity,
    /// Responding agents over configured agents, in [0.0, 1.0]
    pub completeness: f64,
}

/// One question lifecycle
///
/// Owned and mutated only by the orchestrator. Sessions are appended to,
/// never deleted; ledger blocks are referenced by number, not owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier
    pub id: SessionId,
    /// The question asked
    pub question: String,
    /// Current status
    pub status: SessionStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Append-only transition history
    pub status_log: Vec<StatusEntry>,
    /// Failures recorded against this session
    #[serde(default)]
    pub error_log: Vec<SessionErrorEntry>,
    /// Set when the session completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    /// Ledger blocks written for this session, in append order
    #[serde(default)]
    pub ledger_blocks: Vec<u64>,
}

impl Session {
    /// Create a session in the `received` state
    pub fn new(question: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            question: question.into(),
            status: SessionStatus::Received,
            created_at: now,
            status_log: vec![StatusEntry {
                status: SessionStatus::Received,
                timestamp: now,
                message: "question received".to_string(),
            }],
            error_log: Vec::new(),
            quality_metrics: None,
            ledger_blocks: Vec::new(),
        }
    }

    /// Move to `to`, appending a status log entry
    pub fn transition(
        &mut self,
        to: SessionStatus,
        message: impl Into<String>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.status_log.push(StatusEntry {
            status: to,
            timestamp: Utc::now(),
            message: message.into(),
        });
        Ok(())
    }

    /// Attach quality metrics and move to `completed`
    pub fn complete(&mut self, metrics: QualityMetrics) -> Result<(), TransitionError> {
        self.transition(SessionStatus::Completed, "quality metrics attached")?;
        self.quality_metrics = Some(metrics);
        Ok(())
    }

    /// Record an unrecoverable failure and move to `error`
    pub fn fail(
        &mut self,
        reason_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), TransitionError> {
        let message = message.into();
        let reason_code = reason_code.into();
        self.transition(SessionStatus::Error, format!("{}: {}", reason_code, message))?;
        self.error_log.push(SessionErrorEntry {
            timestamp: Utc::now(),
            message,
            reason_code,
        });
        Ok(())
    }

    /// Remember a ledger block written for this session
    pub fn record_block(&mut self, block_number: u64) {
        self.ledger_blocks.push(block_number);
    }

    /// First and last ledger block written for this session
    pub fn block_range(&self) -> Option<(u64, u64)> {
        let first = self.ledger_blocks.iter().min()?;
        let last = self.ledger_blocks.iter().max()?;
        Some((*first, *last))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: SessionId ordering matches u128 ordering
        #[test]
        fn test_session_id_ordering_property(a: u128, b: u128) {
            let id_a = SessionId::from_value(a);
            let id_b = SessionId::from_value(b);
            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        /// Property: a status log only ever grows, whatever transitions are attempted
        #[test]
        fn test_status_log_is_append_only(steps in proptest::collection::vec(0usize..7, 0..20)) {
            let all = [
                SessionStatus::Received,
                SessionStatus::Processing,
                SessionStatus::ResponsesSaved,
                SessionStatus::PipelineComplete,
                SessionStatus::Completed,
                SessionStatus::LedgerVerified,
                SessionStatus::Error,
            ];
            let mut session = Session::new("q");
            for step in steps {
                let before = session.status_log.clone();
                let _ = session.transition(all[step], "attempt");
                prop_assert!(session.status_log.len() >= before.len());
                prop_assert_eq!(&session.status_log[..before.len()], &before[..]);
            }
        }
    }
}
