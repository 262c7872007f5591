//! Comparison report - cross-agent statistics for one session
//!
//! These are value objects computed once per session by the aggregation
//! engine. Maps are keyed by [`ClaimType`] in a `BTreeMap` so serialized
//! output is ordered identically on every run.

use crate::ClaimType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Claim counts bucketed by normalized confidence (`confidence / 10`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    /// Claims at or above the high cutoff
    pub high: usize,
    /// Claims between the low and high cutoffs
    pub medium: usize,
    /// Claims below the low cutoff
    pub low: usize,
}

impl ConfidenceDistribution {
    /// Total bucketed claims
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Categorical source density derived from average sources per claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDensity {
    /// Well corroborated
    High,
    /// Some corroboration
    Medium,
    /// Little or no corroboration
    Low,
}

/// Categorical mapping of the uncertainty rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyLevel {
    /// Most claims verified
    Low,
    /// A sizeable share of claims unverified
    Medium,
    /// Most claims unverified
    High,
}

/// Audit echo of the headline numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transparency {
    /// Claims analyzed across all agents
    pub claims_analyzed: usize,
    /// Verified claims
    pub claims_verified: usize,
    /// Unverified claims
    pub claims_unverified: usize,
    /// Mean claim confidence on a 0-10 scale
    pub average_confidence: f64,
    /// When the report was computed
    pub timestamp: DateTime<Utc>,
}

/// Cross-agent aggregate for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Agent with the highest overall score (earliest configured wins ties)
    pub best_agent: String,
    /// Agent with the lowest overall score (earliest configured wins ties)
    pub worst_agent: String,
    /// Mean overall score across agents
    pub average_score: f64,
    /// Number of agent reports compared
    pub agent_count: usize,

    /// Claims across all agents
    pub total_claims: usize,
    /// Verified claims across all agents
    pub total_verified: usize,
    /// Unverified claims across all agents
    pub total_unverified: usize,

    /// Sources across all claim verifications
    pub total_source_count: usize,
    /// `total_source_count / total_claims` (0.0 without claims)
    pub average_sources_per_claim: f64,
    /// Categorical source density
    pub source_density: SourceDensity,

    /// Claims bucketed by confidence
    pub confidence_distribution: ConfidenceDistribution,
    /// Claims per claim type
    pub claim_type_distribution: BTreeMap<ClaimType, usize>,
    /// Verified fraction per claim type
    pub claim_type_verification_rate: BTreeMap<ClaimType, f64>,

    /// Percentage of claims not verified
    pub uncertainty_rate: f64,
    /// Categorical uncertainty
    pub uncertainty_level: UncertaintyLevel,

    /// Agents with zero extracted claims
    pub neutral_count: usize,
    /// Percentage of agents that were neutral
    pub neutral_rate: f64,
    /// Explanation when the neutral rate is non-trivial
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_assessment_reason: Option<String>,

    /// Claim-weighted mean of per-agent bias scores (neutral agents excluded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_bias_score: Option<f64>,

    /// Suggestions, most actionable first
    pub improvement_suggestions: Vec<String>,

    /// Audit echo
    pub transparency: Transparency,
}

/// Result of comparing agent reports
///
/// Comparing zero reports is not an error: it yields `Unavailable` with an
/// explanatory message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// Statistics were computed
    Available(Box<ComparisonReport>),

    /// Nothing to compare
    Unavailable {
        /// Why no comparison could be made
        message: String,
    },
}

impl ComparisonOutcome {
    /// Whether statistics were computed
    pub fn available(&self) -> bool {
        matches!(self, ComparisonOutcome::Available(_))
    }

    /// The report, when available
    pub fn report(&self) -> Option<&ComparisonReport> {
        match self {
            ComparisonOutcome::Available(report) => Some(report),
            ComparisonOutcome::Unavailable { .. } => None,
        }
    }

    /// The explanatory message, when unavailable
    pub fn message(&self) -> Option<&str> {
        match self {
            ComparisonOutcome::Available(_) => None,
            ComparisonOutcome::Unavailable { message } => Some(message),
        }
    }
}
