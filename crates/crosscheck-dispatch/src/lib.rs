//! Crosscheck Dispatch Coordinator
//!
//! Fans one question out to every configured agent and waits for all of
//! them to settle.
//!
//! # Guarantees
//!
//! - Settle-all: one agent failing, hanging or panicking never cancels or
//!   delays another; every agent yields exactly one `AgentResult`.
//! - Results come back in configuration order, not completion order.
//! - No retries within a dispatch. A fresh dispatch is a new attempt.
//! - Each call has its own timeout, an optional parallelism cap bounds the
//!   number of in-flight calls, and a session `CancellationToken` stops
//!   pending calls.
//!
//! # Examples
//!
//! ```
//! use crosscheck_agents::MockAgent;
//! use crosscheck_dispatch::{CancellationToken, DispatchConfig, Dispatcher};
//! use crosscheck_domain::traits::AgentAdapter;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let agents: Vec<Arc<dyn AgentAdapter>> = vec![
//!     Arc::new(MockAgent::new("a", "The Nile is 6650 km long.")),
//!     Arc::new(MockAgent::new("b", "I think rivers are nice.")),
//! ];
//! let dispatcher = Dispatcher::new(agents, DispatchConfig::default());
//! let results = dispatcher.dispatch("How long is the Nile?", &CancellationToken::new()).await;
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].agent_id, "a");
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod dispatcher;
mod rate_limit;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use rate_limit::RateLimiter;

pub use tokio_util::sync::CancellationToken;
