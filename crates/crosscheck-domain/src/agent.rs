//! Agent results - the normalized outcome of invoking one external answer source
//!
//! Every provider-specific response shape is collapsed at the adapter
//! boundary into `Result<AgentResponse, AgentError>`; nothing downstream
//! inspects what the provider actually returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A successful answer from an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Answer text
    pub text: String,

    /// Wall-clock time the call took, in milliseconds
    pub latency_ms: u64,

    /// Token count reported by the provider (or estimated from whitespace)
    pub token_count: usize,
}

impl AgentResponse {
    /// Create a response, estimating the token count from whitespace-separated words
    pub fn new(text: impl Into<String>, latency_ms: u64) -> Self {
        let text = text.into();
        let token_count = text.split_whitespace().count();
        Self {
            text,
            latency_ms,
            token_count,
        }
    }
}

/// Reason code for a failed agent invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentErrorKind {
    /// The per-agent timeout elapsed
    Timeout,

    /// Network or HTTP-level failure
    Transport,

    /// The provider answered with something that could not be normalized
    InvalidResponse,

    /// The provider (or the local rate limiter) refused the call
    RateLimited,

    /// The owning session was cancelled before the agent settled
    Cancelled,
}

impl AgentErrorKind {
    /// Stable reason code
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentErrorKind::Timeout => "timeout",
            AgentErrorKind::Transport => "transport",
            AgentErrorKind::InvalidResponse => "invalid_response",
            AgentErrorKind::RateLimited => "rate_limited",
            AgentErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AgentErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed agent invocation
///
/// Agent errors are isolated per agent and never fail a session.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct AgentError {
    /// Reason code
    pub kind: AgentErrorKind,

    /// Human-readable detail
    pub message: String,
}

impl AgentError {
    /// Create a new agent error
    pub fn new(kind: AgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Timeout, message)
    }

    /// Shorthand for a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Transport, message)
    }

    /// Shorthand for an invalid-response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::InvalidResponse, message)
    }

    /// Shorthand for a rate-limited error
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::RateLimited, message)
    }

    /// Shorthand for a cancellation
    pub fn cancelled() -> Self {
        Self::new(AgentErrorKind::Cancelled, "session cancelled")
    }
}

/// Settled outcome of one agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentOutcome {
    /// The agent answered
    Ok(AgentResponse),

    /// The agent failed
    Err(AgentError),
}

impl From<Result<AgentResponse, AgentError>> for AgentOutcome {
    fn from(result: Result<AgentResponse, AgentError>) -> Self {
        match result {
            Ok(response) => AgentOutcome::Ok(response),
            Err(error) => AgentOutcome::Err(error),
        }
    }
}

/// Outcome of one agent invocation for one session
///
/// Created exactly once by the dispatch coordinator; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Configured agent identifier
    pub agent_id: String,

    /// Success or per-agent error
    pub outcome: AgentOutcome,

    /// When the invocation settled
    pub responded_at: DateTime<Utc>,
}

impl AgentResult {
    /// Create a result stamped with the current time
    pub fn new(agent_id: impl Into<String>, outcome: AgentOutcome) -> Self {
        Self {
            agent_id: agent_id.into(),
            outcome,
            responded_at: Utc::now(),
        }
    }

    /// The response, if the agent answered
    pub fn response(&self) -> Option<&AgentResponse> {
        match &self.outcome {
            AgentOutcome::Ok(response) => Some(response),
            AgentOutcome::Err(_) => None,
        }
    }

    /// The error, if the agent failed
    pub fn error(&self) -> Option<&AgentError> {
        match &self.outcome {
            AgentOutcome::Ok(_) => None,
            AgentOutcome::Err(error) => Some(error),
        }
    }

    /// Whether the agent answered
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, AgentOutcome::Ok(_))
    }
}
