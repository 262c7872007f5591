//! Pattern-based claim extraction
//!
//! Each sentence is tested against lexical cues in a fixed priority order:
//! statistical, scientific, historical, definitive, then a generic factual
//! shape ("X is the Y"). Hedged or interrogative sentences and sentences
//! with no cue at all are dropped.

use crate::{FactCheckConfig, FactCheckError};
use crosscheck_domain::traits::ClaimExtractor;
use crosscheck_domain::{Claim, ClaimType};
use regex::Regex;
use tracing::debug;

const STATISTICAL: &str = r"(?i)(\d+(\.\d+)?\s*(%|percent\b|per cent\b))|\b\d{1,3}(,\d{3})+\b|\b\d+(\.\d+)?\s*(thousand|million|billion|trillion|km|kilometers|kilometres|miles|meters|metres|kg|kilograms|tons|tonnes|degrees|people|years old)\b|\b(average|median|majority of|rate of|one in \w+)\b";

const SCIENTIFIC: &str = r"(?i)\b(study|studies|research|researchers|scientists|experiment|experiments|peer-reviewed|journal|published in|according to|evidence shows|clinical trial)\b";

const HISTORICAL: &str = r"(?i)\b(in|since|by|during|until|from|around)\s+(1\d{3}|20\d{2})s?\b|\b(1\d{3}|20\d{2})s\b|\b\d{1,2}(st|nd|rd|th)\s+century\b|\b(founded|established|invented|discovered|completed|built|signed|declared)\b";

const DEFINITIVE: &str = r"(?i)\b(always|never|causes|caused|cause of|leads to|led to|results in|resulted in|proves|proved|proven|definitely|certainly|undeniably|is responsible for)\b";

const FACTUAL: &str = r"(?i)\b(is|are|was|were)\s+(the|a|an|one of)\b|\b(located in|known as|capital of|consists of|contains|composed of|made of)\b";

const HEDGE: &str = r"(?i)\b(i think|i believe|i feel|in my opinion|in my view|perhaps|maybe|might|may be|could be|seems|arguably|probably)\b";

/// Lexical claim extractor
pub struct PatternClaimExtractor {
    rules: Vec<(ClaimType, Regex)>,
    hedge: Regex,
    min_sentence_chars: usize,
    max_claims: usize,
}

impl PatternClaimExtractor {
    /// Compile the cue patterns
    pub fn new(config: &FactCheckConfig) -> Result<Self, FactCheckError> {
        Ok(Self {
            rules: vec![
                (ClaimType::Statistical, Regex::new(STATISTICAL)?),
                (ClaimType::Scientific, Regex::new(SCIENTIFIC)?),
                (ClaimType::Historical, Regex::new(HISTORICAL)?),
                (ClaimType::Definitive, Regex::new(DEFINITIVE)?),
                (ClaimType::Other, Regex::new(FACTUAL)?),
            ],
            hedge: Regex::new(HEDGE)?,
            min_sentence_chars: config.min_sentence_chars,
            max_claims: config.max_claims_per_response,
        })
    }

    /// Classify one sentence, `None` if it carries no claim
    pub fn classify(&self, sentence: &str) -> Option<ClaimType> {
        let sentence = sentence.trim();
        if sentence.chars().count() < self.min_sentence_chars
            || sentence.ends_with('?')
            || self.hedge.is_match(sentence)
        {
            return None;
        }
        self.rules
            .iter()
            .find(|(_, pattern)| pattern.is_match(sentence))
            .map(|(claim_type, _)| *claim_type)
    }
}

/// Split on `.`, `!` or `?` followed by whitespace or end of text
///
/// Decimal points ("6.7") stay inside their sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

impl ClaimExtractor for PatternClaimExtractor {
    fn extract_claims(&self, text: &str, source_agent_id: &str) -> Vec<Claim> {
        let claims: Vec<Claim> = split_sentences(text)
            .into_iter()
            .filter_map(|sentence| {
                self.classify(sentence)
                    .map(|claim_type| Claim::new(sentence, claim_type, source_agent_id))
            })
            .take(self.max_claims)
            .collect();

        debug!(agent = %source_agent_id, claims = claims.len(), "Claims extracted");
        claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PatternClaimExtractor {
        PatternClaimExtractor::new(&FactCheckConfig::default()).unwrap()
    }

    #[test]
    fn test_split_keeps_decimals() {
        let sentences = split_sentences("Pi is about 3.14 in value. Is it? Yes!");
        assert_eq!(sentences, vec!["Pi is about 3.14 in value.", "Is it?", "Yes!"]);
        assert_eq!(split_sentences("no terminator"), vec!["no terminator"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_classification_cues() {
        let e = extractor();
        assert_eq!(
            e.classify("About 45% of adults drink coffee daily."),
            Some(ClaimType::Statistical)
        );
        assert_eq!(
            e.classify("The Nile is roughly 6650 km long."),
            Some(ClaimType::Statistical)
        );
        assert_eq!(
            e.classify("A study published in Nature linked sleep to memory."),
            Some(ClaimType::Scientific)
        );
        assert_eq!(
            e.classify("The Eiffel Tower was completed in 1889."),
            Some(ClaimType::Historical)
        );
        assert_eq!(
            e.classify("Smoking causes lung cancer."),
            Some(ClaimType::Definitive)
        );
        assert_eq!(
            e.classify("Paris is the capital of France."),
            Some(ClaimType::Other)
        );
    }

    #[test]
    fn test_opinions_and_questions_are_dropped() {
        let e = extractor();
        assert_eq!(e.classify("I think Paris is the best city."), None);
        assert_eq!(e.classify("Is Paris the capital of France?"), None);
        assert_eq!(e.classify("Rivers are lovely to walk along."), None);
        assert_eq!(e.classify("Yes."), None);
    }

    #[test]
    fn test_extract_attributes_agent_and_keeps_order() {
        let text = "The Eiffel Tower was completed in 1889. I love it. It is 330 meters tall.";
        let claims = extractor().extract_claims(text, "agent-a");

        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].claim_type, ClaimType::Historical);
        assert_eq!(claims[1].claim_type, ClaimType::Statistical);
        assert!(claims.iter().all(|c| c.source_agent_id == "agent-a"));
    }

    #[test]
    fn test_extract_respects_claim_cap() {
        let config = FactCheckConfig {
            max_claims_per_response: 2,
            ..Default::default()
        };
        let e = PatternClaimExtractor::new(&config).unwrap();
        let text = "Water is a liquid. Ice is a solid. Steam is a gas.";
        assert_eq!(e.extract_claims(text, "a").len(), 2);
    }

    #[test]
    fn test_opinion_only_answer_has_no_claims() {
        let text = "Honestly, it depends on what you value. I think both options are fine.";
        assert!(extractor().extract_claims(text, "a").is_empty());
    }
}
