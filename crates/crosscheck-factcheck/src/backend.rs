//! Offline verification backend

use async_trait::async_trait;
use crosscheck_domain::traits::VerificationBackend;
use crosscheck_domain::{Corroboration, Source, VerificationError};
use serde::{Deserialize, Serialize};

/// One reference source, offered for any claim mentioning `keyword`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticSource {
    /// Case-insensitive substring the claim must contain
    pub keyword: String,
    /// Source title
    pub title: String,
    /// Source URL
    pub url: String,
    /// Relevance reported for a match
    #[serde(default = "default_relevance")]
    pub relevance: f64,
}

fn default_relevance() -> f64 {
    1.0
}

/// Fixed keyword → source table
///
/// Answers from memory, never fails. Used for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    sources: Vec<StaticSource>,
}

impl StaticBackend {
    /// Create a backend from a source table
    pub fn new(sources: Vec<StaticSource>) -> Self {
        Self { sources }
    }

    /// Add one source
    pub fn with_source(
        mut self,
        keyword: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        relevance: f64,
    ) -> Self {
        self.sources.push(StaticSource {
            keyword: keyword.into(),
            title: title.into(),
            url: url.into(),
            relevance,
        });
        self
    }
}

#[async_trait]
impl VerificationBackend for StaticBackend {
    async fn verify(&self, claim_text: &str) -> Result<Corroboration, VerificationError> {
        let claim = claim_text.to_lowercase();
        let sources: Vec<Source> = self
            .sources
            .iter()
            .filter(|s| claim.contains(&s.keyword.to_lowercase()))
            .map(|s| Source::new(s.title.clone(), s.url.clone(), s.relevance))
            .collect();
        let matched = !sources.is_empty();
        Ok(Corroboration { sources, matched })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_match_is_case_insensitive() {
        let backend = StaticBackend::default()
            .with_source("eiffel", "Eiffel Tower", "https://en.wikipedia.org/wiki/Eiffel_Tower", 0.9)
            .with_source("nile", "Nile", "https://en.wikipedia.org/wiki/Nile", 1.0);

        let found = backend.verify("The Eiffel Tower was completed in 1889.").await.unwrap();
        assert!(found.matched);
        assert_eq!(found.sources.len(), 1);
        assert_eq!(found.sources[0].title, "Eiffel Tower");

        let missing = backend.verify("Paris is the capital of France.").await.unwrap();
        assert!(!missing.matched);
        assert!(missing.sources.is_empty());
    }
}
