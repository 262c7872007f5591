//! Per-claim verification and per-agent rollup

use crate::FactCheckConfig;
use crosscheck_domain::traits::VerificationBackend;
use crosscheck_domain::{
    AgentFactCheckReport, Claim, ClaimVerification, Corroboration, Source, VerificationError,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Warning on a scored claim whose lookup was not a backend match
pub const UNMATCHED_WARNING: &str = "unmatched: sources found but the backend reported no match";

/// Confidence for a set of corroborating sources
///
/// Sources under `min_relevance` are discarded. The rest contribute
/// `10 × mean relevance × support`, where support grows linearly until
/// `full_support_sources` relevant sources are found. No relevant source
/// means zero confidence.
pub fn score_sources(sources: &[Source], config: &FactCheckConfig) -> (f64, Vec<Source>) {
    let relevant: Vec<Source> = sources
        .iter()
        .filter(|s| s.relevance_score >= config.min_relevance)
        .cloned()
        .collect();
    if relevant.is_empty() {
        return (0.0, relevant);
    }

    let agreement =
        relevant.iter().map(|s| s.relevance_score.clamp(0.0, 1.0)).sum::<f64>() / relevant.len() as f64;
    let full = config.full_support_sources.max(1);
    let support = relevant.len().min(full) as f64 / full as f64;
    let confidence = (10.0 * agreement * support).clamp(0.0, 10.0);
    (confidence, relevant)
}

/// Verifies claims against a backend
pub struct ClaimVerifier {
    backend: Arc<dyn VerificationBackend>,
    config: FactCheckConfig,
}

impl ClaimVerifier {
    /// Create a verifier over `backend`
    pub fn new(backend: Arc<dyn VerificationBackend>, config: FactCheckConfig) -> Self {
        Self { backend, config }
    }

    /// Verify one claim
    ///
    /// Never fails: a backend error or timeout yields a zero-confidence
    /// verification carrying a warning.
    pub async fn verify_claim(&self, claim: Claim) -> ClaimVerification {
        let budget = self.config.verification_timeout();
        let looked_up = match tokio::time::timeout(budget, self.backend.verify(&claim.text)).await {
            Ok(result) => result,
            Err(_) => Err(VerificationError::SourceUnreachable(format!(
                "no answer within {:?}",
                budget
            ))),
        };

        match looked_up {
            Ok(corroboration) => self.score(claim, corroboration),
            Err(e) => {
                warn!(claim = %claim.text, reason = e.reason_code(), "Verification failed: {}", e);
                ClaimVerification::failed(claim, &e)
            }
        }
    }

    fn score(&self, claim: Claim, corroboration: Corroboration) -> ClaimVerification {
        let (confidence, sources) = score_sources(&corroboration.sources, &self.config);
        debug!(
            claim = %claim.text,
            matched = corroboration.matched,
            relevant = sources.len(),
            confidence,
            "Claim scored"
        );

        // Relevant sources the backend itself did not call a match
        let warning = (!corroboration.matched && !sources.is_empty())
            .then(|| UNMATCHED_WARNING.to_string());
        ClaimVerification {
            claim,
            verified: confidence >= self.config.verified_threshold,
            confidence,
            sources,
            warning,
        }
    }
}

/// Roll claim verifications up into an agent report
///
/// `overall_score = w × mean confidence + (1 − w) × 10 × verified ratio`.
/// An agent without claims gets the neutral score, not a low one.
pub fn build_report(
    agent_id: &str,
    claims: Vec<ClaimVerification>,
    bias_score: Option<f64>,
    config: &FactCheckConfig,
) -> AgentFactCheckReport {
    let total_claims = claims.len();
    let verified_count = claims.iter().filter(|c| c.verified).count();

    let overall_score = if total_claims == 0 {
        config.neutral_score
    } else {
        let mean_confidence = claims.iter().map(|c| c.confidence).sum::<f64>() / total_claims as f64;
        let verified_ratio = verified_count as f64 / total_claims as f64;
        config.confidence_weight * mean_confidence
            + (1.0 - config.confidence_weight) * 10.0 * verified_ratio
    };

    AgentFactCheckReport {
        agent_id: agent_id.to_string(),
        claims,
        overall_score: overall_score.clamp(0.0, 10.0),
        verified_count,
        total_claims,
        bias_score: bias_score.map(|b| b.clamp(0.0, 10.0)),
    }
}
