//! Configuration file parsing for the pipeline.
//!
//! One TOML file configures every stage: dispatch budgets, fact-check
//! scoring, aggregation cutoffs, where the ledger and sessions are stored,
//! the verification backend and the agents themselves.
//!
//! ```toml
//! [dispatch]
//! agent_timeout_secs = 20
//!
//! [ledger]
//! path = "crosscheck-ledger.db"
//!
//! [verification]
//! kind = "wikipedia"
//!
//! [[agents]]
//! id = "llama"
//! kind = "ollama"
//! model = "llama3"
//! ```

use crosscheck_agents::{MockAgent, OllamaAgent};
use crosscheck_aggregate::AggregationThresholds;
use crosscheck_dispatch::DispatchConfig;
use crosscheck_domain::traits::{AgentAdapter, VerificationBackend};
use crosscheck_factcheck::{FactCheckConfig, StaticBackend, StaticSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Pipeline configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which adapter an agent entry builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Local Ollama model
    Ollama,
    /// Scripted answer, no network
    Mock,
}

/// One `[[agents]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent identifier used in results and reports
    pub id: String,

    /// Adapter kind
    pub kind: AgentKind,

    /// API endpoint (ollama only, defaults to the local daemon)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model name (required for ollama)
    #[serde(default)]
    pub model: Option<String>,

    /// Fixed answer (required for mock)
    #[serde(default)]
    pub response: Option<String>,

    /// Simulated latency in milliseconds (mock only)
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

impl AgentConfig {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("agent id must not be empty".to_string());
        }
        match self.kind {
            AgentKind::Ollama if self.model.as_deref().is_none_or(str::is_empty) => {
                Err(format!("agent '{}': ollama agents need a model", self.id))
            }
            AgentKind::Mock if self.response.is_none() => {
                Err(format!("agent '{}': mock agents need a response", self.id))
            }
            _ => Ok(()),
        }
    }

    /// Build the adapter this entry describes
    pub fn build(&self) -> Arc<dyn AgentAdapter> {
        match self.kind {
            AgentKind::Ollama => {
                let model = self.model.clone().unwrap_or_default();
                match &self.endpoint {
                    Some(endpoint) => Arc::new(OllamaAgent::new(&self.id, endpoint, model)),
                    None => Arc::new(OllamaAgent::default_endpoint(&self.id, model)),
                }
            }
            AgentKind::Mock => {
                let mut agent =
                    MockAgent::new(&self.id, self.response.clone().unwrap_or_default());
                if let Some(ms) = self.delay_ms {
                    agent = agent.with_delay(Duration::from_millis(ms));
                }
                Arc::new(agent)
            }
        }
    }
}

/// `[verification]` section: where claims are corroborated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VerificationConfig {
    /// MediaWiki full-text search
    Wikipedia {
        /// API endpoint
        #[serde(default = "default_wikipedia_endpoint")]
        endpoint: String,
        /// Search hits considered per claim
        #[serde(default = "default_max_results")]
        max_results: usize,
    },
    /// Offline keyword table
    Static {
        /// Sources offered per keyword
        #[serde(default)]
        sources: Vec<StaticSource>,
    },
}

fn default_wikipedia_endpoint() -> String {
    crosscheck_agents::wikipedia::DEFAULT_API_ENDPOINT.to_string()
}

fn default_max_results() -> usize {
    5
}

impl Default for VerificationConfig {
    fn default() -> Self {
        VerificationConfig::Wikipedia {
            endpoint: default_wikipedia_endpoint(),
            max_results: default_max_results(),
        }
    }
}

impl VerificationConfig {
    /// Build the backend, using `request_timeout` for remote lookups
    pub fn build(&self, request_timeout: Duration) -> Arc<dyn VerificationBackend> {
        match self {
            VerificationConfig::Wikipedia {
                endpoint,
                max_results,
            } => Arc::new(
                crosscheck_agents::WikipediaBackend::new(endpoint)
                    .with_max_results(*max_results)
                    .with_request_timeout(request_timeout),
            ),
            VerificationConfig::Static { sources } => {
                Arc::new(StaticBackend::new(sources.clone()))
            }
        }
    }
}

/// `[ledger]` / `[store]` section
///
/// Without a path the data lives in memory for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub path: Option<PathBuf>,
}

/// Pipeline configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Agent fan-out settings
    pub dispatch: DispatchConfig,

    /// Claim scoring settings
    pub factcheck: FactCheckConfig,

    /// Comparison cutoffs
    pub aggregation: AggregationThresholds,

    /// Ledger storage
    pub ledger: StorageConfig,

    /// Session storage
    pub store: StorageConfig,

    /// Verification backend
    pub verification: VerificationConfig,

    /// Configured agents, in dispatch order
    pub agents: Vec<AgentConfig>,
}

impl PipelineConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        let section = |name: &str, result: Result<(), String>| {
            result.map_err(|e| ConfigError::Invalid(format!("[{}] {}", name, e)))
        };
        section("dispatch", self.dispatch.validate())?;
        section("factcheck", self.factcheck.validate())?;
        section("aggregation", self.aggregation.validate())?;

        if self.agents.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[agents]] entry is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for agent in &self.agents {
            section("agents", agent.validate())?;
            if !seen.insert(agent.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "[agents] duplicate agent id '{}'",
                    agent.id
                )));
            }
        }
        Ok(())
    }

    /// Build every configured agent, in configuration order
    pub fn build_agents(&self) -> Vec<Arc<dyn AgentAdapter>> {
        self.agents.iter().map(AgentConfig::build).collect()
    }

    /// Build the configured verification backend
    pub fn build_backend(&self) -> Arc<dyn VerificationBackend> {
        self.verification
            .build(Duration::from_secs(self.factcheck.verification_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [dispatch]
        agent_timeout_secs = 15
        max_parallelism = 2

        [factcheck]
        verified_threshold = 7.5

        [aggregation]
        high_uncertainty = 70.0

        [ledger]
        path = "/var/lib/crosscheck/ledger.db"

        [verification]
        kind = "static"

        [[verification.sources]]
        keyword = "nile"
        title = "Nile"
        url = "https://en.wikipedia.org/wiki/Nile"

        [[agents]]
        id = "llama"
        kind = "ollama"
        model = "llama3"

        [[agents]]
        id = "scripted"
        kind = "mock"
        response = "The Nile is 6650 km long."
        delay_ms = 5
    "#;

    #[test]
    fn test_full_config_parses() {
        let config = PipelineConfig::from_toml(FULL).unwrap();

        assert_eq!(config.dispatch.agent_timeout_secs, 15);
        assert_eq!(config.dispatch.max_parallelism, Some(2));
        assert_eq!(config.factcheck.verified_threshold, 7.5);
        assert_eq!(config.factcheck.min_relevance, 0.3);
        assert_eq!(config.aggregation.high_uncertainty, 70.0);
        assert_eq!(
            config.ledger.path.as_deref(),
            Some(Path::new("/var/lib/crosscheck/ledger.db"))
        );
        assert_eq!(config.store.path, None);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[1].kind, AgentKind::Mock);

        match &config.verification {
            VerificationConfig::Static { sources } => {
                assert_eq!(sources.len(), 1);
                assert_eq!(sources[0].relevance, 1.0);
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn test_agents_build_in_order() {
        let config = PipelineConfig::from_toml(FULL).unwrap();
        let agents = config.build_agents();
        let ids: Vec<&str> = agents.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["llama", "scripted"]);
    }

    #[test]
    fn test_verification_defaults_to_wikipedia() {
        let config = PipelineConfig::from_toml(
            r#"
            [[agents]]
            id = "a"
            kind = "mock"
            response = "ok"
            "#,
        )
        .unwrap();
        assert_eq!(config.verification, VerificationConfig::default());
    }

    #[test]
    fn test_missing_agents_rejected() {
        let err = PipelineConfig::from_toml("[dispatch]\nagent_timeout_secs = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_duplicate_agent_ids_rejected() {
        let err = PipelineConfig::from_toml(
            r#"
            [[agents]]
            id = "a"
            kind = "mock"
            response = "one"

            [[agents]]
            id = "a"
            kind = "mock"
            response = "two"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate agent id 'a'"));
    }

    #[test]
    fn test_ollama_without_model_rejected() {
        let err = PipelineConfig::from_toml(
            r#"
            [[agents]]
            id = "llama"
            kind = "ollama"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("need a model"));
    }

    #[test]
    fn test_invalid_section_is_named() {
        let err = PipelineConfig::from_toml(
            r#"
            [dispatch]
            agent_timeout_secs = 0

            [[agents]]
            id = "a"
            kind = "mock"
            response = "ok"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[dispatch]"));
    }

    #[test]
    fn test_unknown_agent_kind_is_a_parse_error() {
        let err = PipelineConfig::from_toml(
            r#"
            [[agents]]
            id = "a"
            kind = "carrier-pigeon"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
