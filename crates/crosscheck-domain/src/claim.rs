//! Claim module - atomic factual assertions extracted from agent answers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a claim, assigned from lexical cues in the source sentence
///
/// The declaration order is the canonical reporting order used by the
/// aggregation engine, so distributions are emitted deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Numeric or percentage assertions
    Statistical,

    /// Research-attributed assertions ("a study found ...")
    Scientific,

    /// Dated references to past events
    Historical,

    /// Causal or absolute phrasing ("always", "causes", "proves")
    Definitive,

    /// Claim-bearing sentence that fits none of the above
    Other,
}

impl ClaimType {
    /// All claim types in canonical order
    pub const ALL: [ClaimType; 5] = [
        ClaimType::Statistical,
        ClaimType::Scientific,
        ClaimType::Historical,
        ClaimType::Definitive,
        ClaimType::Other,
    ];

    /// Get the claim type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Statistical => "statistical",
            ClaimType::Scientific => "scientific",
            ClaimType::Historical => "historical",
            ClaimType::Definitive => "definitive",
            ClaimType::Other => "other",
        }
    }

    /// Parse a claim type from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "statistical" => Some(ClaimType::Statistical),
            "scientific" => Some(ClaimType::Scientific),
            "historical" => Some(ClaimType::Historical),
            "definitive" => Some(ClaimType::Definitive),
            "other" => Some(ClaimType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClaimType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid claim type: {}", s))
    }
}

/// One atomic factual assertion made by an agent
///
/// Claims are immutable once extracted and belong to exactly one agent result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// The sentence carrying the assertion
    pub text: String,

    /// Lexical category of the assertion
    pub claim_type: ClaimType,

    /// Agent whose answer contained this claim
    pub source_agent_id: String,
}

impl Claim {
    /// Create a new claim
    pub fn new(
        text: impl Into<String>,
        claim_type: ClaimType,
        source_agent_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            claim_type,
            source_agent_id: source_agent_id.into(),
        }
    }
}
