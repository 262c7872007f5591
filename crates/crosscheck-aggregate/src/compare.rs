//! Cross-agent comparison

use crate::AggregationThresholds;
use chrono::{DateTime, Utc};
use crosscheck_domain::{
    AgentFactCheckReport, ClaimType, ComparisonOutcome, ComparisonReport, ConfidenceDistribution,
    SourceDensity, Transparency, UncertaintyLevel,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Message carried by the outcome when nobody answered
pub const NO_REPORTS_MESSAGE: &str =
    "No agent reports to compare: every agent failed to respond";

/// Slack for bucket boundaries (3.3 / 10 must land on 0.33)
const EPSILON: f64 = 1e-9;

/// Compare reports, stamping the transparency block with the current time
pub fn compare_reports(
    reports: &[AgentFactCheckReport],
    thresholds: &AggregationThresholds,
) -> ComparisonOutcome {
    compare_reports_at(reports, thresholds, Utc::now())
}

/// Compare reports as of `timestamp`
///
/// `reports` must be in agent configuration order: it only matters for
/// breaking score ties, where the earlier agent wins.
pub fn compare_reports_at(
    reports: &[AgentFactCheckReport],
    thresholds: &AggregationThresholds,
    timestamp: DateTime<Utc>,
) -> ComparisonOutcome {
    let Some(first) = reports.first() else {
        return ComparisonOutcome::Unavailable {
            message: NO_REPORTS_MESSAGE.to_string(),
        };
    };
    let agent_count = reports.len();

    let mut best = first;
    let mut worst = first;
    for report in &reports[1..] {
        if report.overall_score > best.overall_score {
            best = report;
        }
        if report.overall_score < worst.overall_score {
            worst = report;
        }
    }
    let average_score =
        reports.iter().map(|r| r.overall_score).sum::<f64>() / agent_count as f64;

    let total_claims: usize = reports.iter().map(|r| r.total_claims).sum();
    let total_verified: usize = reports.iter().map(|r| r.verified_count).sum();
    let total_unverified = total_claims.saturating_sub(total_verified);

    let verifications = || reports.iter().flat_map(|r| r.claims.iter());
    let total_source_count: usize = verifications().map(|v| v.sources.len()).sum();
    let average_sources_per_claim = ratio(total_source_count as f64, total_claims);
    let source_density = if at_least(average_sources_per_claim, thresholds.high_source_density) {
        SourceDensity::High
    } else if at_least(average_sources_per_claim, thresholds.medium_source_density) {
        SourceDensity::Medium
    } else {
        SourceDensity::Low
    };

    let mut confidence_distribution = ConfidenceDistribution::default();
    let mut by_type: BTreeMap<ClaimType, (usize, usize)> = BTreeMap::new();
    for v in verifications() {
        let normalized = v.confidence / 10.0;
        if at_least(normalized, thresholds.high_confidence) {
            confidence_distribution.high += 1;
        } else if at_least(normalized, thresholds.low_confidence) {
            confidence_distribution.medium += 1;
        } else {
            confidence_distribution.low += 1;
        }

        let entry = by_type.entry(v.claim.claim_type).or_default();
        entry.0 += 1;
        if v.verified {
            entry.1 += 1;
        }
    }
    let claim_type_distribution = by_type.iter().map(|(t, (n, _))| (*t, *n)).collect();
    let claim_type_verification_rate = by_type
        .iter()
        .map(|(t, (n, verified))| (*t, ratio(*verified as f64, *n)))
        .collect();

    let uncertainty_rate = 100.0 * ratio(total_unverified as f64, total_claims);
    let uncertainty_level = if at_least(uncertainty_rate, thresholds.high_uncertainty) {
        UncertaintyLevel::High
    } else if at_least(uncertainty_rate, thresholds.medium_uncertainty) {
        UncertaintyLevel::Medium
    } else {
        UncertaintyLevel::Low
    };

    let neutral_count = reports.iter().filter(|r| r.is_neutral()).count();
    let neutral_rate = 100.0 * ratio(neutral_count as f64, agent_count);
    let neutral_assessment_reason = neutral_reason(neutral_count, agent_count, neutral_rate, thresholds);

    let aggregated_bias_score = claim_weighted_bias(reports);

    let verification_count = verifications().count();
    let average_confidence = ratio(
        verifications().map(|v| v.confidence).sum::<f64>(),
        verification_count,
    );

    let mut report = ComparisonReport {
        best_agent: best.agent_id.clone(),
        worst_agent: worst.agent_id.clone(),
        average_score,
        agent_count,
        total_claims,
        total_verified,
        total_unverified,
        total_source_count,
        average_sources_per_claim,
        source_density,
        confidence_distribution,
        claim_type_distribution,
        claim_type_verification_rate,
        uncertainty_rate,
        uncertainty_level,
        neutral_count,
        neutral_rate,
        neutral_assessment_reason,
        aggregated_bias_score,
        improvement_suggestions: Vec::new(),
        transparency: Transparency {
            claims_analyzed: total_claims,
            claims_verified: total_verified,
            claims_unverified: total_unverified,
            average_confidence,
            timestamp,
        },
    };
    report.improvement_suggestions =
        suggestions(&report, best.overall_score - worst.overall_score, thresholds);

    debug!(
        agents = agent_count,
        claims = total_claims,
        best = %report.best_agent,
        "Reports compared"
    );
    ComparisonOutcome::Available(Box::new(report))
}

fn at_least(value: f64, cutoff: f64) -> bool {
    value >= cutoff - EPSILON
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

fn neutral_reason(
    neutral: usize,
    agents: usize,
    rate: f64,
    thresholds: &AggregationThresholds,
) -> Option<String> {
    if neutral == 0 || !at_least(rate, thresholds.neutral_note_rate) {
        return None;
    }
    Some(if neutral == agents {
        "all agents gave opinion-only answers without verifiable claims".to_string()
    } else if neutral * 2 > agents {
        "majority of agents gave opinion-only answers".to_string()
    } else {
        format!(
            "{} of {} agents gave opinion-only answers without verifiable claims",
            neutral, agents
        )
    })
}

/// Mean bias weighted by claim count; agents without claims or without a
/// bias score carry no weight
fn claim_weighted_bias(reports: &[AgentFactCheckReport]) -> Option<f64> {
    let (weighted, weight) = reports
        .iter()
        .filter(|r| r.total_claims > 0)
        .filter_map(|r| r.bias_score.map(|b| (b, r.total_claims as f64)))
        .fold((0.0, 0.0), |(sum, total), (bias, w)| (sum + bias * w, total + w));
    (weight > 0.0).then(|| weighted / weight)
}

/// Rule set, most actionable first
fn suggestions(
    report: &ComparisonReport,
    score_spread: f64,
    thresholds: &AggregationThresholds,
) -> Vec<String> {
    let mut out = Vec::new();
    let all_neutral = report.neutral_count == report.agent_count;

    if all_neutral {
        out.push(
            "No agent made verifiable claims: rephrase the question to ask for specific facts"
                .to_string(),
        );
    } else {
        if report.source_density == SourceDensity::Low {
            out.push(
                "Low source density: broaden the verification source pool".to_string(),
            );
        }
        match report.uncertainty_level {
            UncertaintyLevel::High => out.push(
                "High uncertainty rate: require more corroborating sources or stricter claim thresholds"
                    .to_string(),
            ),
            UncertaintyLevel::Medium => out.push(
                "Moderate uncertainty rate: review unverified claims before relying on them"
                    .to_string(),
            ),
            UncertaintyLevel::Low => {}
        }
        if report.confidence_distribution.low > report.confidence_distribution.high {
            out.push(
                "Most claims have low confidence: prefer agents that cite checkable facts"
                    .to_string(),
            );
        }
        if report.neutral_assessment_reason.is_some() {
            out.push(
                "Several agents answered with opinions only: ask for sourced, factual answers"
                    .to_string(),
            );
        }
    }
    if report.agent_count > 1 && at_least(score_spread, thresholds.score_divergence) {
        out.push(format!(
            "Agent scores diverge widely: '{}' was most reliable for this question",
            report.best_agent
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosscheck_domain::{Claim, ClaimVerification, Source};

    fn verification(claim_type: ClaimType, confidence: f64, verified: bool, sources: usize) -> ClaimVerification {
        ClaimVerification {
            claim: Claim::new("claim", claim_type, "x"),
            verified,
            confidence,
            sources: (0..sources)
                .map(|i| Source::new(format!("s{}", i), "https://example.org", 0.9))
                .collect(),
            warning: None,
        }
    }

    fn report(agent: &str, claims: Vec<ClaimVerification>, overall: f64, bias: Option<f64>) -> AgentFactCheckReport {
        let verified_count = claims.iter().filter(|c| c.verified).count();
        AgentFactCheckReport {
            agent_id: agent.to_string(),
            total_claims: claims.len(),
            claims,
            overall_score: overall,
            verified_count,
            bias_score: bias,
        }
    }

    fn unwrap(outcome: ComparisonOutcome) -> ComparisonReport {
        match outcome {
            ComparisonOutcome::Available(report) => *report,
            ComparisonOutcome::Unavailable { message } => panic!("unavailable: {}", message),
        }
    }

    #[test]
    fn test_no_reports_is_unavailable() {
        let outcome = compare_reports(&[], &AggregationThresholds::default());
        assert!(!outcome.available());
        assert!(!outcome.message().unwrap().is_empty());
    }

    #[test]
    fn test_ties_go_to_earlier_agent() {
        let reports = vec![
            report("a", vec![verification(ClaimType::Other, 8.0, true, 1)], 7.0, None),
            report("b", vec![verification(ClaimType::Other, 8.0, true, 1)], 7.0, None),
        ];
        let r = unwrap(compare_reports(&reports, &AggregationThresholds::default()));
        assert_eq!(r.best_agent, "a");
        assert_eq!(r.worst_agent, "a");
    }

    #[test]
    fn test_confidence_bucket_boundaries() {
        let reports = vec![report(
            "a",
            vec![
                verification(ClaimType::Other, 6.7, true, 1),
                verification(ClaimType::Other, 6.6, false, 1),
                verification(ClaimType::Other, 3.3, false, 1),
                verification(ClaimType::Other, 3.2, false, 1),
            ],
            5.0,
            None,
        )];
        let r = unwrap(compare_reports(&reports, &AggregationThresholds::default()));
        assert_eq!(
            r.confidence_distribution,
            ConfidenceDistribution { high: 1, medium: 2, low: 1 }
        );
    }

    #[test]
    fn test_source_density_and_uncertainty_levels() {
        let reports = vec![report(
            "a",
            vec![
                verification(ClaimType::Statistical, 0.0, false, 0),
                verification(ClaimType::Statistical, 0.0, false, 1),
                verification(ClaimType::Historical, 9.0, true, 1),
            ],
            3.0,
            None,
        )];
        let r = unwrap(compare_reports(&reports, &AggregationThresholds::default()));
        assert_eq!(r.total_source_count, 2);
        assert_eq!(r.source_density, SourceDensity::Low);
        assert!((r.uncertainty_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(r.uncertainty_level, UncertaintyLevel::High);
        assert_eq!(r.claim_type_distribution[&ClaimType::Statistical], 2);
        assert_eq!(r.claim_type_verification_rate[&ClaimType::Statistical], 0.0);
        assert_eq!(r.claim_type_verification_rate[&ClaimType::Historical], 1.0);
        assert_eq!(
            r.improvement_suggestions[0],
            "Low source density: broaden the verification source pool"
        );
        assert!(r.improvement_suggestions[1].starts_with("High uncertainty rate"));
    }

    #[test]
    fn test_bias_is_claim_weighted_and_skips_neutral_agents() {
        let reports = vec![
            report("a", vec![verification(ClaimType::Other, 9.0, true, 2); 3], 9.0, Some(2.0)),
            report("b", vec![verification(ClaimType::Other, 9.0, true, 2)], 9.0, Some(6.0)),
            report("c", Vec::new(), 5.0, Some(10.0)),
        ];
        let r = unwrap(compare_reports(&reports, &AggregationThresholds::default()));
        // (3 × 2.0 + 1 × 6.0) / 4
        assert_eq!(r.aggregated_bias_score, Some(3.0));
    }

    #[test]
    fn test_bias_absent_without_scores() {
        let reports = vec![report("a", vec![verification(ClaimType::Other, 9.0, true, 2)], 9.0, None)];
        let r = unwrap(compare_reports(&reports, &AggregationThresholds::default()));
        assert_eq!(r.aggregated_bias_score, None);
    }

    #[test]
    fn test_all_neutral_agents() {
        let reports = vec![
            report("a", Vec::new(), 5.0, None),
            report("b", Vec::new(), 5.0, None),
        ];
        let r = unwrap(compare_reports(&reports, &AggregationThresholds::default()));
        assert_eq!(r.neutral_count, 2);
        assert_eq!(r.neutral_rate, 100.0);
        assert_eq!(r.total_claims, 0);
        assert_eq!(r.average_sources_per_claim, 0.0);
        assert_eq!(r.transparency.average_confidence, 0.0);
        assert_eq!(
            r.neutral_assessment_reason.as_deref(),
            Some("all agents gave opinion-only answers without verifiable claims")
        );
        assert_eq!(r.improvement_suggestions.len(), 1);
        assert!(r.improvement_suggestions[0].starts_with("No agent made verifiable claims"));
    }
}
