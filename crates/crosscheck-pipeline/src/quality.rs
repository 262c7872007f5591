//! Session quality metrics

use crosscheck_domain::{
    AgentFactCheckReport, AgentResult, ComparisonOutcome, QualityMetrics, Severity,
    UncertaintyLevel,
};

/// Share of failed agents at which severity is high regardless of claims
const HIGH_FAILURE_RATE: f64 = 0.5;

/// Compute the metrics attached when a session completes
///
/// - `confidence`: mean claim confidence over every report, scaled to [0, 1]
/// - `consensus`: 1 minus the best/worst overall score gap, scaled to [0, 1]
/// - `severity`: the worse of the uncertainty level and the agent failure rate
/// - `completeness`: responding agents over configured agents
pub fn compute_quality(
    results: &[AgentResult],
    reports: &[AgentFactCheckReport],
    comparison: &ComparisonOutcome,
) -> QualityMetrics {
    let configured = results.len();
    let answered = results.iter().filter(|r| r.is_ok()).count();
    let completeness = ratio(answered, configured);

    let (confidence_sum, claim_count) = reports
        .iter()
        .flat_map(|r| &r.claims)
        .fold((0.0, 0usize), |(sum, n), c| (sum + c.confidence, n + 1));
    let confidence = if claim_count == 0 {
        0.0
    } else {
        (confidence_sum / claim_count as f64 / 10.0).clamp(0.0, 1.0)
    };

    let consensus = consensus(reports);
    let severity = severity(comparison, 1.0 - completeness);

    QualityMetrics {
        confidence,
        consensus,
        severity,
        completeness,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn consensus(reports: &[AgentFactCheckReport]) -> f64 {
    if reports.len() < 2 {
        return 1.0;
    }
    let scores = reports.iter().map(|r| r.overall_score);
    let max = scores.clone().fold(f64::MIN, f64::max);
    let min = scores.fold(f64::MAX, f64::min);
    (1.0 - (max - min) / 10.0).clamp(0.0, 1.0)
}

fn severity(comparison: &ComparisonOutcome, failure_rate: f64) -> Severity {
    let uncertainty = match comparison.report() {
        Some(report) => report.uncertainty_level,
        // Nobody answered
        None => return Severity::High,
    };
    if uncertainty == UncertaintyLevel::High || failure_rate >= HIGH_FAILURE_RATE {
        Severity::High
    } else if uncertainty == UncertaintyLevel::Medium || failure_rate > 0.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosscheck_aggregate::{compare_reports, AggregationThresholds};
    use crosscheck_domain::{
        AgentError, AgentOutcome, AgentResponse, Claim, ClaimType, ClaimVerification,
    };

    fn ok(id: &str) -> AgentResult {
        AgentResult::new(id, AgentOutcome::Ok(AgentResponse::new("answer", 10)))
    }

    fn failed(id: &str) -> AgentResult {
        AgentResult::new(id, AgentOutcome::Err(AgentError::timeout("slow")))
    }

    fn report(id: &str, confidences: &[f64]) -> AgentFactCheckReport {
        let claims: Vec<ClaimVerification> = confidences
            .iter()
            .map(|&confidence| ClaimVerification {
                claim: Claim::new("The Nile is 6650 km long.", ClaimType::Statistical, id),
                verified: confidence >= 6.7,
                confidence,
                sources: Vec::new(),
                warning: None,
            })
            .collect();
        let total_claims = claims.len();
        let verified_count = claims.iter().filter(|c| c.verified).count();
        let overall_score = if total_claims == 0 {
            5.0
        } else {
            confidences.iter().sum::<f64>() / total_claims as f64
        };
        AgentFactCheckReport {
            agent_id: id.to_string(),
            claims,
            overall_score,
            verified_count,
            total_claims,
            bias_score: None,
        }
    }

    #[test]
    fn test_all_agents_agree() {
        let results = vec![ok("a"), ok("b")];
        let reports = vec![report("a", &[10.0, 8.0]), report("b", &[9.0])];
        let comparison = compare_reports(&reports, &AggregationThresholds::default());

        let q = compute_quality(&results, &reports, &comparison);
        assert!((q.confidence - 0.9).abs() < 1e-9);
        assert!((q.consensus - 1.0).abs() < 1e-9);
        assert_eq!(q.completeness, 1.0);
        assert_eq!(q.severity, Severity::Low);
    }

    #[test]
    fn test_one_failure_raises_severity() {
        let results = vec![ok("a"), ok("b"), failed("c")];
        let reports = vec![report("a", &[10.0]), report("b", &[4.0])];
        let comparison = compare_reports(&reports, &AggregationThresholds::default());

        let q = compute_quality(&results, &reports, &comparison);
        assert!((q.completeness - 2.0 / 3.0).abs() < 1e-9);
        assert!((q.consensus - 0.4).abs() < 1e-9);
        // 1 of 2 claims unverified: 50% uncertainty is medium
        assert_eq!(q.severity, Severity::Medium);
    }

    #[test]
    fn test_nobody_answered() {
        let results = vec![failed("a"), failed("b")];
        let comparison = compare_reports(&[], &AggregationThresholds::default());

        let q = compute_quality(&results, &[], &comparison);
        assert_eq!(q.completeness, 0.0);
        assert_eq!(q.confidence, 0.0);
        assert_eq!(q.consensus, 1.0);
        assert_eq!(q.severity, Severity::High);
    }
}
