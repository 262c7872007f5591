//! Crosscheck Domain Layer
//!
//! Core records and collaborator traits for the multi-agent verification
//! pipeline. Every type in this crate is a plain, serializable value: the
//! components that produce and consume them live in the other crates.
//!
//! ## Key Concepts
//!
//! - **Agent**: an external answer source, invoked through [`traits::AgentAdapter`]
//! - **AgentResult**: the settled outcome (`Ok` text or `Err` reason) of one agent call
//! - **Claim**: an atomic factual assertion extracted from an agent's answer
//! - **ClaimVerification**: the corroboration outcome for one claim
//! - **AgentFactCheckReport**: per-agent rollup of claim verifications
//! - **ComparisonReport**: cross-agent statistics for one session
//! - **LedgerBlock**: one hash-linked audit record
//! - **Session**: one question lifecycle, driven through [`SessionStatus`]
//!
//! ## Architecture
//!
//! - No I/O and no runtime dependencies beyond serialization and time
//! - Trait definitions for every external interaction (agents, claim
//!   extraction, verification backends, bias scoring, persistence)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod claim;
pub mod comparison;
pub mod ledger;
pub mod session;
pub mod traits;
pub mod verification;

// Re-exports for convenience
pub use agent::{AgentError, AgentErrorKind, AgentOutcome, AgentResponse, AgentResult};
pub use claim::{Claim, ClaimType};
pub use comparison::{
    ComparisonOutcome, ComparisonReport, ConfidenceDistribution, SourceDensity, Transparency,
    UncertaintyLevel,
};
pub use ledger::{EventType, LedgerBlock};
pub use session::{
    QualityMetrics, Session, SessionErrorEntry, SessionId, SessionStatus, Severity,
    StatusEntry, TransitionError,
};
pub use verification::{
    AgentFactCheckReport, ClaimVerification, Corroboration, Source, VerificationError,
};
