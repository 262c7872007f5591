//! Per-agent call spacing
//!
//! The limiter is plain state owned by whoever builds the dispatcher. Each
//! test or process constructs its own instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between calls to the same agent
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing one call per agent every `min_interval`
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(HashMap::new()),
        }
    }

    /// Record a call for `agent_id` if it is allowed now
    ///
    /// Returns the remaining wait when the agent was called too recently.
    pub fn try_acquire(&self, agent_id: &str) -> Result<(), Duration> {
        let now = Instant::now();
        // A poisoned map only ever holds timestamps; keep using it
        let mut last_call = self.last_call.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(previous) = last_call.get(agent_id) {
            let elapsed = now.saturating_duration_since(*previous);
            if elapsed < self.min_interval {
                return Err(self.min_interval - elapsed);
            }
        }
        last_call.insert(agent_id.to_string(), now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_second_call_inside_interval_is_refused() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        assert!(limiter.try_acquire("a").is_ok());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(limiter.try_acquire("a"), Err(Duration::from_secs(3)));

        // Other agents are tracked separately
        assert!(limiter.try_acquire("b").is_ok());

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(limiter.try_acquire("a").is_ok());
    }

    #[test]
    fn test_zero_interval_never_limits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        assert!(limiter.try_acquire("a").is_ok());
        assert!(limiter.try_acquire("a").is_ok());
    }
}
