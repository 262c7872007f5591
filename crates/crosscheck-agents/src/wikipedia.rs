//! Wikipedia verification backend
//!
//! Uses MediaWiki full-text search to find articles that corroborate a
//! claim. Relevance is the share of the claim's content words that appear
//! in the article title and search snippet.

use async_trait::async_trait;
use crosscheck_domain::traits::VerificationBackend;
use crosscheck_domain::{Corroboration, Source, VerificationError};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Default MediaWiki API endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Relevance at or above which the backend reports a match
const MATCH_RELEVANCE: f64 = 0.5;

#[derive(Deserialize)]
struct SearchEnvelope {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Corroboration lookups against Wikipedia
pub struct WikipediaBackend {
    endpoint: String,
    max_results: usize,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl WikipediaBackend {
    /// Create a backend against a MediaWiki API endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_results: 5,
            client: reqwest::Client::new(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Limit the number of search hits considered per claim
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Per-request HTTP timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for WikipediaBackend {
    fn default() -> Self {
        Self::new(DEFAULT_API_ENDPOINT)
    }
}

/// Lowercase words longer than three characters
fn content_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Drop the `<span class="searchmatch">` markup MediaWiki puts in snippets
fn strip_markup(snippet: &str) -> String {
    let mut out = String::with_capacity(snippet.len());
    let mut in_tag = false;
    for c in snippet.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Share of the claim's content words found in `evidence`
fn relevance(claim_words: &HashSet<String>, evidence: &str) -> f64 {
    if claim_words.is_empty() {
        return 0.0;
    }
    let evidence_words = content_words(evidence);
    let hits = claim_words.intersection(&evidence_words).count();
    hits as f64 / claim_words.len() as f64
}

fn article_url(title: &str) -> String {
    format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"))
}

#[async_trait]
impl VerificationBackend for WikipediaBackend {
    async fn verify(&self, claim_text: &str) -> Result<Corroboration, VerificationError> {
        let limit = self.max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.request_timeout)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", claim_text),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| VerificationError::SourceUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerificationError::SourceUnreachable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| VerificationError::ParseFailure(e.to_string()))?;

        let claim_words = content_words(claim_text);
        let mut sources: Vec<Source> = envelope
            .query
            .search
            .into_iter()
            .map(|hit| {
                let evidence = format!("{} {}", hit.title, strip_markup(&hit.snippet));
                let score = relevance(&claim_words, &evidence);
                Source::new(hit.title.clone(), article_url(&hit.title), score)
            })
            .collect();

        // Stable sort keeps MediaWiki's ranking among equal scores
        sources.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        let matched = sources
            .first()
            .is_some_and(|s| s.relevance_score >= MATCH_RELEVANCE);

        Ok(Corroboration { sources, matched })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        let snippet = r#"The <span class="searchmatch">Nile</span> is a river"#;
        assert_eq!(strip_markup(snippet), "The Nile is a river");
    }

    #[test]
    fn test_relevance_counts_content_words() {
        let claim = content_words("The Eiffel Tower was completed in 1889.");
        // eiffel, tower, completed, 1889
        assert_eq!(claim.len(), 4);
        let score = relevance(&claim, "Eiffel Tower wrought-iron tower completed 1889");
        assert_eq!(score, 1.0);
        assert_eq!(relevance(&claim, "unrelated article"), 0.0);
    }

    #[test]
    fn test_article_url() {
        assert_eq!(
            article_url("Eiffel Tower"),
            "https://en.wikipedia.org/wiki/Eiffel_Tower"
        );
    }

    #[test]
    fn test_search_envelope_parses() {
        let body = r#"{"batchcomplete":"","query":{"search":[{"ns":0,"title":"Nile","snippet":"longest <span>river</span>"}]}}"#;
        let parsed: SearchEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.query.search.len(), 1);
        assert_eq!(parsed.query.search[0].title, "Nile");
    }
}
