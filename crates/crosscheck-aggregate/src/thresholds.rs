//! Bucket and rule cutoffs for the comparison report

use serde::{Deserialize, Serialize};

/// Cutoffs used to categorize comparison statistics
///
/// Confidence cutoffs apply to `confidence / 10`; uncertainty and neutral
/// cutoffs are percentages.
///
/// # Examples
///
/// ```
/// use crosscheck_aggregate::AggregationThresholds;
///
/// let t = AggregationThresholds::default();
/// assert_eq!(t.high_confidence, 0.67);
/// assert_eq!(t.high_source_density, 2.0);
/// assert!(t.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationThresholds {
    /// Normalized confidence at or above which a claim is "high"
    /// Default: 0.67
    pub high_confidence: f64,

    /// Normalized confidence at or above which a claim is "medium"
    /// Default: 0.33
    pub low_confidence: f64,

    /// Sources per claim for "high" density
    /// Default: 2.0
    pub high_source_density: f64,

    /// Sources per claim for "medium" density
    /// Default: 1.0
    pub medium_source_density: f64,

    /// Uncertainty percentage at which the level becomes "medium"
    /// Default: 30.0
    pub medium_uncertainty: f64,

    /// Uncertainty percentage at which the level becomes "high"
    /// Default: 60.0
    pub high_uncertainty: f64,

    /// Neutral-agent percentage at which a neutral assessment note is added
    /// Default: 25.0
    pub neutral_note_rate: f64,

    /// Best/worst score gap that triggers the divergence suggestion
    /// Default: 3.0
    pub score_divergence: f64,
}

impl Default for AggregationThresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.67,
            low_confidence: 0.33,
            high_source_density: 2.0,
            medium_source_density: 1.0,
            medium_uncertainty: 30.0,
            high_uncertainty: 60.0,
            neutral_note_rate: 25.0,
            score_divergence: 3.0,
        }
    }
}

impl AggregationThresholds {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.low_confidence)
            || !(0.0..=1.0).contains(&self.high_confidence)
            || self.low_confidence > self.high_confidence
        {
            return Err("confidence cutoffs must satisfy 0 <= low <= high <= 1".to_string());
        }
        if self.medium_source_density < 0.0 || self.medium_source_density > self.high_source_density {
            return Err("source density cutoffs must satisfy 0 <= medium <= high".to_string());
        }
        if !(0.0..=100.0).contains(&self.medium_uncertainty)
            || !(0.0..=100.0).contains(&self.high_uncertainty)
            || self.medium_uncertainty > self.high_uncertainty
        {
            return Err("uncertainty cutoffs must satisfy 0 <= medium <= high <= 100".to_string());
        }
        if !(0.0..=100.0).contains(&self.neutral_note_rate) {
            return Err("neutral_note_rate must be a percentage".to_string());
        }
        if self.score_divergence < 0.0 {
            return Err("score_divergence must not be negative".to_string());
        }
        Ok(())
    }
}
