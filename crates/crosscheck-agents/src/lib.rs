//! Crosscheck Agent Adapters
//!
//! Implementations of the `AgentAdapter` and `VerificationBackend` traits
//! from `crosscheck-domain`.
//!
//! # Adapters
//!
//! - `MockAgent`: Deterministic scripted agent for testing
//! - `OllamaAgent`: Local Ollama API integration
//!
//! # Verification backends
//!
//! - `WikipediaBackend`: MediaWiki full-text search as a corroboration source
//!
//! # Examples
//!
//! ```
//! use crosscheck_agents::MockAgent;
//! use crosscheck_domain::traits::AgentAdapter;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let agent = MockAgent::new("mock-a", "Hello from the agent!");
//! let response = agent.invoke("any question", Duration::from_secs(1)).await.unwrap();
//! assert_eq!(response.text, "Hello from the agent!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod wikipedia;

use async_trait::async_trait;
use crosscheck_domain::traits::AgentAdapter;
use crosscheck_domain::{AgentError, AgentErrorKind, AgentResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use ollama::OllamaAgent;
pub use wikipedia::WikipediaBackend;

/// Mock agent for deterministic testing
///
/// Returns pre-configured answers without making any network calls. A
/// simulated latency and a scripted failure can be configured to exercise
/// timeout and partial-failure handling.
///
/// # Examples
///
/// ```
/// use crosscheck_agents::MockAgent;
/// use crosscheck_domain::AgentErrorKind;
///
/// let agent = MockAgent::new("a", "default answer")
///     .with_response("capital of France?", "Paris is the capital of France.");
///
/// let failing = MockAgent::failing("b", AgentErrorKind::Transport);
/// ```
#[derive(Debug, Clone)]
pub struct MockAgent {
    id: String,
    default_response: String,
    responses: HashMap<String, String>,
    delay: Option<Duration>,
    failure: Option<AgentErrorKind>,
    call_count: Arc<AtomicUsize>,
}

impl MockAgent {
    /// Create a MockAgent with a fixed answer for all questions
    pub fn new(id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_response: response.into(),
            responses: HashMap::new(),
            delay: None,
            failure: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockAgent that always fails with `kind`
    pub fn failing(id: impl Into<String>, kind: AgentErrorKind) -> Self {
        let mut agent = Self::new(id, "");
        agent.failure = Some(kind);
        agent
    }

    /// Answer a specific question differently
    pub fn with_response(mut self, question: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(question.into(), response.into());
        self
    }

    /// Simulate latency before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `invoke` was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl AgentAdapter for MockAgent {
    fn id(&self) -> &str {
        &self.id
    }

    async fn invoke(&self, question: &str, timeout: Duration) -> Result<AgentResponse, AgentError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();

        if let Some(delay) = self.delay {
            if delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(AgentError::timeout(format!(
                    "mock agent '{}' exceeded {:?}",
                    self.id, timeout
                )));
            }
            tokio::time::sleep(delay).await;
        }

        if let Some(kind) = self.failure {
            return Err(AgentError::new(kind, format!("mock agent '{}' failure", self.id)));
        }

        let text = self
            .responses
            .get(question)
            .unwrap_or(&self.default_response)
            .clone();

        Ok(AgentResponse::new(text, started.elapsed().as_millis() as u64))
    }
}
