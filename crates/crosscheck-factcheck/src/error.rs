//! Fact-check error types

use thiserror::Error;

/// Errors that can occur while fact-checking
///
/// Backend failures are not errors at this level: they are folded into the
/// affected claim's verification.
#[derive(Error, Debug)]
pub enum FactCheckError {
    /// The session was cancelled while verifications were pending
    #[error("Fact-check cancelled")]
    Cancelled,

    /// A claim pattern failed to compile
    #[error("Invalid claim pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
