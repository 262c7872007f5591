//! Crosscheck Session Pipeline
//!
//! Ties the stages together. An [`Orchestrator`] takes one question through
//! the session state machine:
//!
//! ```text
//! received → processing → responses_saved → pipeline_complete → completed → ledger_verified
//! ```
//!
//! Each transition is committed only after its results are saved to the
//! [`SessionStore`](crosscheck_domain::traits::SessionStore) and, where the
//! stage produces an audit event, appended to the ledger. Agent and claim
//! failures are data; ledger, store and cancellation failures end the
//! session in `error` with the partial results kept.
//!
//! # Examples
//!
//! ```
//! use crosscheck_ledger::{Ledger, MemoryLedgerStore};
//! use crosscheck_pipeline::{Orchestrator, PipelineConfig};
//! use crosscheck_store::MemorySessionStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = PipelineConfig::from_toml(r#"
//!     [verification]
//!     kind = "static"
//!
//!     [[agents]]
//!     id = "a"
//!     kind = "mock"
//!     response = "I think the Nile is lovely."
//! "#).unwrap();
//!
//! let ledger = Arc::new(Ledger::new(MemoryLedgerStore::new()));
//! let orchestrator =
//!     Orchestrator::from_config(&config, ledger.clone(), MemorySessionStore::new()).unwrap();
//!
//! let outcome = orchestrator.run("How long is the Nile?").await;
//! assert!(outcome.succeeded());
//! assert_eq!(ledger.len().unwrap(), 3);
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod quality;

pub use config::{AgentConfig, AgentKind, ConfigError, PipelineConfig, StorageConfig, VerificationConfig};
pub use error::PipelineError;
pub use orchestrator::{Orchestrator, SessionOutcome};
pub use quality::compute_quality;
