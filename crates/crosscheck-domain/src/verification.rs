//! Verification records - per-claim corroboration and per-agent rollups

use crate::Claim;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An external source consulted while verifying a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Source title
    pub title: String,

    /// Source location
    pub url: String,

    /// Relevance of the source to the claim [0.0, 1.0]
    pub relevance_score: f64,
}

impl Source {
    /// Create a new source
    pub fn new(title: impl Into<String>, url: impl Into<String>, relevance_score: f64) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            relevance_score,
        }
    }
}

/// What a verification backend returns for one claim text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corroboration {
    /// Candidate sources, most relevant first
    pub sources: Vec<Source>,

    /// Whether the backend itself considers the claim matched
    pub matched: bool,
}

/// Errors raised by a verification backend
///
/// These are never propagated past the claim verifier: they are downgraded
/// into a zero-confidence [`ClaimVerification`] carrying a warning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    /// The external source could not be reached (or timed out)
    #[error("Source unreachable: {0}")]
    SourceUnreachable(String),

    /// The external source answered with something unparseable
    #[error("Parse failure: {0}")]
    ParseFailure(String),
}

impl VerificationError {
    /// Stable reason code
    pub fn reason_code(&self) -> &'static str {
        match self {
            VerificationError::SourceUnreachable(_) => "source_unreachable",
            VerificationError::ParseFailure(_) => "parse_failure",
        }
    }
}

/// Verification outcome for one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerification {
    /// The verified claim
    pub claim: Claim,

    /// Whether confidence crossed the verification threshold
    pub verified: bool,

    /// Confidence on a 0-10 scale
    pub confidence: f64,

    /// Corroborating sources in backend order (possibly empty)
    pub sources: Vec<Source>,

    /// Set when verification could not run normally, or ran without a
    /// backend match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ClaimVerification {
    /// Zero-confidence verification recorded when the backend failed
    pub fn failed(claim: Claim, error: &VerificationError) -> Self {
        Self {
            claim,
            verified: false,
            confidence: 0.0,
            sources: Vec::new(),
            warning: Some(format!("{} ({})", error, error.reason_code())),
        }
    }
}

/// Per-agent fact-check rollup
///
/// Derived deterministically from the claim verifications it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFactCheckReport {
    /// Agent identifier
    pub agent_id: String,

    /// Verifications in extraction order
    pub claims: Vec<ClaimVerification>,

    /// Blended trust score on a 0-10 scale
    pub overall_score: f64,

    /// Number of verified claims
    pub verified_count: usize,

    /// Number of extracted claims
    pub total_claims: usize,

    /// Bias score on a 0-10 scale, when a scorer is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_score: Option<f64>,
}

impl AgentFactCheckReport {
    /// An agent with no extracted claims gave an opinion-only answer
    pub fn is_neutral(&self) -> bool {
        self.total_claims == 0
    }

    /// Mean claim confidence (0.0 when there are no claims)
    pub fn average_confidence(&self) -> f64 {
        if self.claims.is_empty() {
            return 0.0;
        }
        self.claims.iter().map(|c| c.confidence).sum::<f64>() / self.claims.len() as f64
    }

    /// Total number of sources across all claims
    pub fn total_sources(&self) -> usize {
        self.claims.iter().map(|c| c.sources.len()).sum()
    }

    /// Claims that failed verification
    pub fn unverified_count(&self) -> usize {
        self.total_claims.saturating_sub(self.verified_count)
    }
}
