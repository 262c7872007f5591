//! Crosscheck Claim Verifier
//!
//! Turns agent answers into comparable trust statistics:
//!
//! 1. `PatternClaimExtractor` splits an answer into sentences and keeps the
//!    ones carrying a claim-bearing lexical cue.
//! 2. `ClaimVerifier` looks each claim up in a `VerificationBackend` and
//!    scores the corroboration on a 0-10 scale.
//! 3. `build_report` rolls the verifications up into an
//!    `AgentFactCheckReport`.
//!
//! Backend failures are recorded on the affected claim and never abort a
//! report.
//!
//! # Examples
//!
//! ```
//! use crosscheck_factcheck::{FactCheckConfig, FactChecker, PatternClaimExtractor, StaticBackend};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = FactCheckConfig::default();
//! let backend = StaticBackend::default()
//!     .with_source("nile", "Nile", "https://en.wikipedia.org/wiki/Nile", 1.0);
//! let checker = FactChecker::new(
//!     Arc::new(PatternClaimExtractor::new(&config).unwrap()),
//!     Arc::new(backend),
//!     config,
//! );
//!
//! let report = checker
//!     .check_response("a", "The Nile is about 6650 km long.", &CancellationToken::new())
//!     .await
//!     .unwrap();
//! assert_eq!(report.total_claims, 1);
//! # }
//! ```

#![warn(missing_docs)]

mod backend;
mod checker;
mod config;
mod error;
mod extractor;
mod verifier;

pub use backend::{StaticBackend, StaticSource};
pub use checker::FactChecker;
pub use config::FactCheckConfig;
pub use error::FactCheckError;
pub use extractor::{split_sentences, PatternClaimExtractor};
pub use verifier::{build_report, score_sources, ClaimVerifier, UNMATCHED_WARNING};
