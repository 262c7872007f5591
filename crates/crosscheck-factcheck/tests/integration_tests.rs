//! Integration tests for crosscheck-factcheck
//!
//! Run whole answers through extraction, verification and rollup.

use async_trait::async_trait;
use crosscheck_domain::traits::VerificationBackend;
use crosscheck_domain::{ClaimType, Corroboration, Source, VerificationError};
use crosscheck_factcheck::{FactCheckConfig, FactChecker, PatternClaimExtractor};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Corroborates everything except claims mentioning "Mars"
struct FlakyBackend;

#[async_trait]
impl VerificationBackend for FlakyBackend {
    async fn verify(&self, claim_text: &str) -> Result<Corroboration, VerificationError> {
        if claim_text.contains("Mars") {
            return Err(VerificationError::ParseFailure("unexpected payload".to_string()));
        }
        Ok(Corroboration {
            sources: vec![
                Source::new("Reference A", "https://example.org/a", 0.9),
                Source::new("Reference B", "https://example.org/b", 0.7),
            ],
            matched: true,
        })
    }
}

fn checker(config: FactCheckConfig) -> FactChecker {
    FactChecker::new(
        Arc::new(PatternClaimExtractor::new(&config).unwrap()),
        Arc::new(FlakyBackend),
        config,
    )
}

#[tokio::test]
async fn test_one_unreachable_source_does_not_abort_report() {
    let answer = "About 71% of the Earth is covered by water. \
                  Mars is the fourth planet from the Sun. \
                  Honestly I think space is fascinating.";

    let report = checker(FactCheckConfig::default())
        .check_response("agent-a", answer, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total_claims, 2);
    assert_eq!(report.claims[0].claim.claim_type, ClaimType::Statistical);
    assert!(report.claims[0].verified);
    assert!(report.claims[0].warning.is_none());

    let failed = &report.claims[1];
    assert!(!failed.verified);
    assert_eq!(failed.confidence, 0.0);
    assert!(failed.warning.as_deref().unwrap().contains("parse_failure"));

    assert_eq!(report.verified_count, 1);
    // 0.6 × mean(8.0, 0.0) + 0.4 × 10 × 0.5
    assert!((report.overall_score - 4.4).abs() < 1e-9);
}

#[tokio::test]
async fn test_stricter_threshold_verifies_less() {
    let answer = "About 71% of the Earth is covered by water.";
    let default = checker(FactCheckConfig::default())
        .check_response("a", answer, &CancellationToken::new())
        .await
        .unwrap();
    let strict = checker(FactCheckConfig::strict())
        .check_response("a", answer, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(default.verified_count, 1);
    assert_eq!(strict.verified_count, 0);
}
