//! Ollama Agent Implementation
//!
//! Wraps one model served by a local Ollama instance as an answer source.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama generate API
//! - Configurable endpoint and model
//! - Per-call timeout supplied by the dispatcher
//! - Provider failures normalized into `AgentError` reason codes
//!
//! No retries happen here: a failed call is reported once and the
//! dispatcher decides what to do with it.
//!
//! # Examples
//!
//! ```no_run
//! use crosscheck_agents::OllamaAgent;
//!
//! let agent = OllamaAgent::new("llama3", "http://localhost:11434", "llama3");
//! ```

use async_trait::async_trait;
use crosscheck_domain::traits::AgentAdapter;
use crosscheck_domain::{AgentError, AgentResponse};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Ollama-backed agent
pub struct OllamaAgent {
    id: String,
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<usize>,
}

impl OllamaAgent {
    /// Create a new Ollama agent
    ///
    /// # Parameters
    ///
    /// - `id`: Agent identifier used in reports
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a new Ollama agent against the default local endpoint
    pub fn default_endpoint(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(id, DEFAULT_ENDPOINT, model)
    }

    /// Model served by this agent
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Map a reqwest failure onto an agent reason code
fn classify_transport_error(e: reqwest::Error) -> AgentError {
    if e.is_timeout() {
        AgentError::timeout(format!("Request timed out: {}", e))
    } else if e.is_decode() {
        AgentError::invalid_response(format!("Failed to parse response: {}", e))
    } else {
        AgentError::transport(format!("Request failed: {}", e))
    }
}

#[async_trait]
impl AgentAdapter for OllamaAgent {
    fn id(&self) -> &str {
        &self.id
    }

    async fn invoke(&self, question: &str, timeout: Duration) -> Result<AgentResponse, AgentError> {
        let url = format!("{}/api/generate", self.endpoint);
        let started = Instant::now();

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt: question,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::rate_limited(format!("HTTP {}", status)));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AgentError::transport(format!(
                "Model not available: {}",
                self.model
            )));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::transport(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response
            .json::<OllamaGenerateResponse>()
            .await
            .map_err(classify_transport_error)?;

        if body.response.trim().is_empty() {
            return Err(AgentError::invalid_response("Empty answer"));
        }

        let latency_ms = started.elapsed().as_millis() as u64;
        debug!(agent = %self.id, latency_ms, "Ollama answered");

        let mut answer = AgentResponse::new(body.response, latency_ms);
        if let Some(tokens) = body.eval_count {
            answer.token_count = tokens;
        }
        Ok(answer)
    }
}
