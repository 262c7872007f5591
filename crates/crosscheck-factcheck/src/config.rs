//! Fact-check configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scoring and extraction parameters
///
/// Confidence values are on a 0-10 scale; relevance values on 0.0-1.0.
///
/// # Examples
///
/// ```
/// use crosscheck_factcheck::FactCheckConfig;
///
/// let config = FactCheckConfig::default();
/// assert_eq!(config.verified_threshold, 6.7);
/// assert_eq!(config.neutral_score, 5.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactCheckConfig {
    /// Confidence at or above which a claim counts as verified
    /// Default: 6.7 (the high confidence bucket)
    pub verified_threshold: f64,

    /// Sources below this relevance are ignored
    /// Default: 0.3
    pub min_relevance: f64,

    /// Relevant sources needed for full support
    /// Default: 2
    pub full_support_sources: usize,

    /// Weight of mean claim confidence in the overall score; the verified
    /// ratio gets the rest
    /// Default: 0.6
    pub confidence_weight: f64,

    /// Overall score given to an agent with no claims
    /// Default: 5.0
    pub neutral_score: f64,

    /// Per-claim verification budget (in seconds)
    /// Default: 10
    pub verification_timeout_secs: u64,

    /// Verifications in flight per response
    /// Default: 4
    pub max_concurrent_verifications: usize,

    /// Agent answers checked at once
    /// Default: 4
    pub max_concurrent_checks: usize,

    /// Extraction stops after this many claims per response
    /// Default: 25
    pub max_claims_per_response: usize,

    /// Shorter sentences are never claims
    /// Default: 12
    pub min_sentence_chars: usize,
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            verified_threshold: 6.7,
            min_relevance: 0.3,
            full_support_sources: 2,
            confidence_weight: 0.6,
            neutral_score: 5.0,
            verification_timeout_secs: 10,
            max_concurrent_verifications: 4,
            max_concurrent_checks: 4,
            max_claims_per_response: 25,
            min_sentence_chars: 12,
        }
    }
}

impl FactCheckConfig {
    /// Higher bar for verification, more sources required
    pub fn strict() -> Self {
        Self {
            verified_threshold: 8.0,
            min_relevance: 0.5,
            full_support_sources: 3,
            ..Self::default()
        }
    }

    /// Lower bar for verification
    pub fn lenient() -> Self {
        Self {
            verified_threshold: 5.0,
            min_relevance: 0.2,
            full_support_sources: 1,
            ..Self::default()
        }
    }

    /// Per-claim budget as Duration
    pub fn verification_timeout(&self) -> Duration {
        Duration::from_secs(self.verification_timeout_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=10.0).contains(&self.verified_threshold) {
            return Err("verified_threshold must be between 0 and 10".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_relevance) {
            return Err("min_relevance must be between 0 and 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_weight) {
            return Err("confidence_weight must be between 0 and 1".to_string());
        }
        if !(0.0..=10.0).contains(&self.neutral_score) {
            return Err("neutral_score must be between 0 and 10".to_string());
        }
        if self.full_support_sources == 0 {
            return Err("full_support_sources must be at least 1".to_string());
        }
        if self.verification_timeout_secs == 0 {
            return Err("verification_timeout_secs must be greater than 0".to_string());
        }
        if self.max_concurrent_verifications == 0 {
            return Err("max_concurrent_verifications must be at least 1".to_string());
        }
        if self.max_concurrent_checks == 0 {
            return Err("max_concurrent_checks must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(FactCheckConfig::default().validate().is_ok());
        assert!(FactCheckConfig::strict().validate().is_ok());
        assert!(FactCheckConfig::lenient().validate().is_ok());
        assert!(FactCheckConfig::strict().verified_threshold > FactCheckConfig::lenient().verified_threshold);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let config = FactCheckConfig {
            confidence_weight: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FactCheckConfig {
            verified_threshold: 11.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FactCheckConfig {
            max_concurrent_checks: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FactCheckConfig = toml::from_str("verified_threshold = 7.5").unwrap();
        assert_eq!(config.verified_threshold, 7.5);
        assert_eq!(config.min_relevance, 0.3);
    }
}
