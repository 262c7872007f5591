//! Configuration for the dispatch coordinator

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for agent dispatch
///
/// # Examples
///
/// ```
/// use crosscheck_dispatch::DispatchConfig;
///
/// let config = DispatchConfig::default();
/// assert_eq!(config.agent_timeout_secs, 30);
/// assert!(config.max_parallelism.is_none());
///
/// let config = DispatchConfig::strict();
/// assert_eq!(config.agent_timeout_secs, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Per-agent time budget (in seconds)
    /// Default: 30
    pub agent_timeout_secs: u64,

    /// Maximum number of agent calls in flight at once
    /// Default: unbounded (one call per configured agent)
    pub max_parallelism: Option<usize>,

    /// Minimum spacing between two calls to the same agent (in milliseconds)
    /// Used to build the injected `RateLimiter`; `None` disables it
    pub min_call_interval_ms: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            agent_timeout_secs: 30,
            max_parallelism: None,
            min_call_interval_ms: None,
        }
    }
}

impl DispatchConfig {
    /// Short budget, at most two calls in flight
    ///
    /// Suitable for shared provider quotas.
    pub fn strict() -> Self {
        Self {
            agent_timeout_secs: 10,
            max_parallelism: Some(2),
            min_call_interval_ms: Some(1_000),
        }
    }

    /// Long budget for slow local models
    pub fn lenient() -> Self {
        Self {
            agent_timeout_secs: 120,
            max_parallelism: None,
            min_call_interval_ms: None,
        }
    }

    /// Per-agent budget as Duration
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }

    /// Rate-limit spacing as Duration, if enabled
    pub fn min_call_interval(&self) -> Option<Duration> {
        self.min_call_interval_ms.map(Duration::from_millis)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.agent_timeout_secs == 0 {
            return Err("agent_timeout_secs must be greater than 0".to_string());
        }
        if self.max_parallelism == Some(0) {
            return Err("max_parallelism must be at least 1 when set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.agent_timeout(), Duration::from_secs(30));
        assert!(config.min_call_interval().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(DispatchConfig::strict().validate().is_ok());
        assert!(DispatchConfig::lenient().validate().is_ok());
        assert!(
            DispatchConfig::strict().agent_timeout_secs
                < DispatchConfig::lenient().agent_timeout_secs
        );
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let config = DispatchConfig {
            agent_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DispatchConfig {
            max_parallelism: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DispatchConfig = toml::from_str("max_parallelism = 3").unwrap();
        assert_eq!(config.max_parallelism, Some(3));
        assert_eq!(config.agent_timeout_secs, 30);
    }
}
