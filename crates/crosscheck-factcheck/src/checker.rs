//! Response-level fact checking

use crate::verifier::{build_report, ClaimVerifier};
use crate::{FactCheckConfig, FactCheckError};
use crosscheck_domain::traits::{BiasScorer, ClaimExtractor, VerificationBackend};
use crosscheck_domain::{AgentFactCheckReport, AgentResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Extracts, verifies and rolls up the claims of agent answers
pub struct FactChecker {
    extractor: Arc<dyn ClaimExtractor>,
    verifier: ClaimVerifier,
    bias_scorer: Option<Arc<dyn BiasScorer>>,
    config: FactCheckConfig,
}

impl FactChecker {
    /// Create a fact checker
    pub fn new(
        extractor: Arc<dyn ClaimExtractor>,
        backend: Arc<dyn VerificationBackend>,
        config: FactCheckConfig,
    ) -> Self {
        Self {
            extractor,
            verifier: ClaimVerifier::new(backend, config.clone()),
            bias_scorer: None,
            config,
        }
    }

    /// Fill `bias_score` on every report using `scorer`
    pub fn with_bias_scorer(mut self, scorer: Arc<dyn BiasScorer>) -> Self {
        self.bias_scorer = Some(scorer);
        self
    }

    /// Fact-check one answer
    ///
    /// Claims are verified concurrently (bounded by
    /// `max_concurrent_verifications`) and reported in extraction order.
    pub async fn check_response(
        &self,
        agent_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentFactCheckReport, FactCheckError> {
        let claims = self.extractor.extract_claims(text, agent_id);
        let verifying = stream::iter(claims)
            .map(|claim| self.verifier.verify_claim(claim))
            .buffered(self.config.max_concurrent_verifications.max(1))
            .collect::<Vec<_>>();

        let verifications = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FactCheckError::Cancelled),
            done = verifying => done,
        };

        let bias = self.bias_scorer.as_ref().and_then(|s| s.score(text));
        let report = build_report(agent_id, verifications, bias, &self.config);
        info!(
            agent = %agent_id,
            claims = report.total_claims,
            verified = report.verified_count,
            overall_score = report.overall_score,
            "Agent fact-checked"
        );
        Ok(report)
    }

    /// Fact-check every successful result into `reports`, in result order
    ///
    /// Up to `max_concurrent_checks` answers are checked at once. Failed
    /// agents produce no report. On cancellation the reports finished so far
    /// stay in `reports` and `Cancelled` is returned.
    pub async fn check_results(
        &self,
        results: &[AgentResult],
        cancel: &CancellationToken,
        reports: &mut Vec<AgentFactCheckReport>,
    ) -> Result<(), FactCheckError> {
        let answers = results
            .iter()
            .filter_map(|r| r.response().map(|response| (r.agent_id.as_str(), response.text.as_str())));
        let checks = stream::iter(answers)
            .map(|(agent_id, text)| self.check_response(agent_id, text, cancel))
            .buffered(self.config.max_concurrent_checks.max(1));
        futures::pin_mut!(checks);

        let mut failure = None;
        while let Some(checked) = checks.next().await {
            match checked {
                Ok(report) => reports.push(report),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => {
                info!(kept = reports.len(), "Fact-check stopped: {}", e);
                Err(e)
            }
            None => Ok(()),
        }
    }
}
