//! Settle-all fan-out over the configured agents

use crate::{DispatchConfig, RateLimiter};
use crosscheck_domain::traits::AgentAdapter;
use crosscheck_domain::{AgentError, AgentOutcome, AgentResponse, AgentResult};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Dispatch coordinator
///
/// Owns the agent list (in configuration order) and the injected rate-limit
/// state. Dispatching never fails as a whole: every per-agent problem is
/// folded into that agent's `AgentResult`.
pub struct Dispatcher {
    agents: Vec<Arc<dyn AgentAdapter>>,
    config: DispatchConfig,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl Dispatcher {
    /// Create a dispatcher over `agents`, kept in the given order
    pub fn new(agents: Vec<Arc<dyn AgentAdapter>>, config: DispatchConfig) -> Self {
        Self {
            agents,
            config,
            rate_limiter: None,
        }
    }

    /// Share a rate limiter with this dispatcher
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Agent identifiers in configuration order
    pub fn agent_ids(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.id().to_string()).collect()
    }

    /// Active configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Ask every agent `question` and wait until all of them settle
    ///
    /// Returns exactly one result per configured agent, in configuration
    /// order. Cancelling `cancel` settles the pending agents as
    /// `cancelled` instead of waiting for them.
    pub async fn dispatch(&self, question: &str, cancel: &CancellationToken) -> Vec<AgentResult> {
        let budget = self.config.agent_timeout();
        let permits = self
            .config
            .max_parallelism
            .map(|n| Arc::new(Semaphore::new(n)));
        let question: Arc<str> = Arc::from(question);

        info!(
            agents = self.agents.len(),
            timeout = ?budget,
            max_parallelism = ?self.config.max_parallelism,
            "Dispatching question"
        );

        let mut join_set = JoinSet::new();
        for (index, agent) in self.agents.iter().enumerate() {
            let call = AgentCall {
                agent: Arc::clone(agent),
                question: Arc::clone(&question),
                budget,
                permits: permits.clone(),
                rate_limiter: self.rate_limiter.clone(),
                cancel: cancel.clone(),
            };
            join_set.spawn(async move {
                let agent_id = call.agent.id().to_string();
                let outcome = AssertUnwindSafe(call.settle())
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| Err(AgentError::transport("agent call panicked")));
                (index, AgentResult::new(agent_id, AgentOutcome::from(outcome)))
            });
        }

        let mut slots: Vec<Option<AgentResult>> = vec![None; self.agents.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "Agent task aborted"),
            }
        }

        let results: Vec<AgentResult> = slots
            .into_iter()
            .zip(&self.agents)
            .map(|(slot, agent)| {
                slot.unwrap_or_else(|| {
                    AgentResult::new(agent.id(), AgentOutcome::Err(AgentError::cancelled()))
                })
            })
            .collect();

        let answered = results.iter().filter(|r| r.is_ok()).count();
        info!(
            answered,
            failed = results.len() - answered,
            "All agents settled"
        );
        results
    }
}

/// One agent invocation and everything it needs to run on its own task
struct AgentCall {
    agent: Arc<dyn AgentAdapter>,
    question: Arc<str>,
    budget: Duration,
    permits: Option<Arc<Semaphore>>,
    rate_limiter: Option<Arc<RateLimiter>>,
    cancel: CancellationToken,
}

impl AgentCall {
    async fn settle(self) -> Result<AgentResponse, AgentError> {
        let id = self.agent.id();
        if self.cancel.is_cancelled() {
            return Err(AgentError::cancelled());
        }

        if let Some(limiter) = &self.rate_limiter {
            if let Err(wait) = limiter.try_acquire(id) {
                warn!(agent = %id, retry_in = ?wait, "Agent rate limited");
                return Err(AgentError::rate_limited(format!(
                    "agent '{}' called again too soon, retry in {:?}",
                    id, wait
                )));
            }
        }

        let _permit = match &self.permits {
            Some(permits) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(AgentError::cancelled()),
                permit = Arc::clone(permits).acquire_owned() => Some(
                    permit.map_err(|_| AgentError::transport("dispatch permits closed"))?,
                ),
            },
            None => None,
        };

        debug!(agent = %id, "Invoking agent");
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AgentError::cancelled()),
            settled = tokio::time::timeout(self.budget, self.agent.invoke(&self.question, self.budget)) => {
                settled.unwrap_or_else(|_| {
                    Err(AgentError::timeout(format!("no answer within {:?}", self.budget)))
                })
            }
        };

        match &result {
            Ok(response) => debug!(
                agent = %id,
                latency_ms = response.latency_ms,
                tokens = response.token_count,
                "Agent answered"
            ),
            Err(e) => warn!(agent = %id, reason = e.kind.as_str(), "Agent failed: {}", e.message),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crosscheck_agents::MockAgent;
    use crosscheck_domain::AgentErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Ignores its budget and never answers
    struct HangingAgent;

    #[async_trait]
    impl AgentAdapter for HangingAgent {
        fn id(&self) -> &str {
            "hanging"
        }

        async fn invoke(&self, _q: &str, _t: Duration) -> Result<AgentResponse, AgentError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(AgentResponse::new("too late", 3_600_000))
        }
    }

    struct PanickingAgent;

    #[async_trait]
    impl AgentAdapter for PanickingAgent {
        fn id(&self) -> &str {
            "panicking"
        }

        async fn invoke(&self, _q: &str, _t: Duration) -> Result<AgentResponse, AgentError> {
            panic!("provider bug");
        }
    }

    /// Tracks how many calls overlap
    struct ProbeAgent {
        id: String,
        in_flight: Arc<AtomicUsize>,
        max_seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AgentAdapter for ProbeAgent {
        fn id(&self) -> &str {
            &self.id
        }

        async fn invoke(&self, _q: &str, _t: Duration) -> Result<AgentResponse, AgentError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(1)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(AgentResponse::new("probe", 1_000))
        }
    }

    fn dispatcher(agents: Vec<Arc<dyn AgentAdapter>>) -> Dispatcher {
        Dispatcher::new(agents, DispatchConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_returns_every_agent() {
        let d = dispatcher(vec![
            Arc::new(MockAgent::new("a", "Water boils at 100 degrees Celsius.")),
            Arc::new(MockAgent::failing("b", AgentErrorKind::Transport)),
            Arc::new(HangingAgent),
            Arc::new(MockAgent::new("c", "Opinion only.")),
        ]);

        let results = d.dispatch("q", &CancellationToken::new()).await;

        let ids: Vec<&str> = results.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "hanging", "c"]);
        assert!(results[0].is_ok());
        assert_eq!(results[1].error().unwrap().kind, AgentErrorKind::Transport);
        assert_eq!(results[2].error().unwrap().kind, AgentErrorKind::Timeout);
        assert!(results[3].is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_configuration_order() {
        let d = dispatcher(vec![
            Arc::new(MockAgent::new("slow", "s").with_delay(Duration::from_secs(3))),
            Arc::new(MockAgent::new("fast", "f").with_delay(Duration::from_millis(10))),
        ]);

        let results = d.dispatch("q", &CancellationToken::new()).await;
        assert_eq!(results[0].agent_id, "slow");
        assert_eq!(results[1].agent_id, "fast");
        assert_eq!(d.agent_ids(), vec!["slow", "fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_agent_does_not_delay_beyond_budget() {
        let config = DispatchConfig {
            agent_timeout_secs: 5,
            ..Default::default()
        };
        let d = Dispatcher::new(
            vec![Arc::new(HangingAgent), Arc::new(MockAgent::new("a", "x"))],
            config,
        );

        let started = tokio::time::Instant::now();
        let results = d.dispatch("q", &CancellationToken::new()).await;
        assert!(started.elapsed() < Duration::from_secs(6));
        assert_eq!(results[0].error().unwrap().kind, AgentErrorKind::Timeout);
        assert!(results[1].is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallelism_cap_bounds_in_flight_calls() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let agents: Vec<Arc<dyn AgentAdapter>> = (0..4)
            .map(|i| {
                Arc::new(ProbeAgent {
                    id: format!("p{}", i),
                    in_flight: Arc::clone(&in_flight),
                    max_seen: Arc::clone(&max_seen),
                }) as Arc<dyn AgentAdapter>
            })
            .collect();
        let config = DispatchConfig {
            max_parallelism: Some(2),
            ..Default::default()
        };

        let results = Dispatcher::new(agents, config)
            .dispatch("q", &CancellationToken::new())
            .await;

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(max_seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_settles_pending_agents() {
        let d = dispatcher(vec![
            Arc::new(MockAgent::new("quick", "q").with_delay(Duration::from_millis(100))),
            Arc::new(MockAgent::new("slow", "s").with_delay(Duration::from_secs(20))),
        ]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let results = d.dispatch("q", &cancel).await;
        assert!(results[0].is_ok());
        assert_eq!(results[1].error().unwrap().kind, AgentErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_already_cancelled_dispatch_invokes_nobody() {
        let agent = MockAgent::new("a", "x");
        let d = dispatcher(vec![Arc::new(agent.clone())]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = d.dispatch("q", &cancel).await;
        assert_eq!(results[0].error().unwrap().kind, AgentErrorKind::Cancelled);
        assert_eq!(agent.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_agent_is_not_invoked() {
        let agent = MockAgent::new("a", "x");
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60)));
        let d = dispatcher(vec![Arc::new(agent.clone())]).with_rate_limiter(limiter);

        let first = d.dispatch("q", &CancellationToken::new()).await;
        let second = d.dispatch("q", &CancellationToken::new()).await;

        assert!(first[0].is_ok());
        assert_eq!(second[0].error().unwrap().kind, AgentErrorKind::RateLimited);
        assert_eq!(agent.call_count(), 1);
    }

    #[tokio::test]
    async fn test_panicking_agent_is_isolated() {
        let d = dispatcher(vec![
            Arc::new(PanickingAgent),
            Arc::new(MockAgent::new("a", "x")),
        ]);

        let results = d.dispatch("q", &CancellationToken::new()).await;
        assert_eq!(results[0].error().unwrap().kind, AgentErrorKind::Transport);
        assert!(results[1].is_ok());
    }

    #[tokio::test]
    async fn test_no_agents_yields_no_results() {
        let results = dispatcher(Vec::new())
            .dispatch("q", &CancellationToken::new())
            .await;
        assert!(results.is_empty());
    }
}
