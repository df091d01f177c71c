//! Pattern-based PII analyzer.
//!
//! Each recognizer is a compiled regex with a confidence score and an optional
//! validator. Overlapping candidates are resolved greedily: higher score wins,
//! then the longer span, then the earlier start.

use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::recognizers::{
    luhn_valid, ssn_valid, CREDIT_CARD, EMAIL, IP_ADDRESS, PHONE, URL, US_SSN,
};

/// Entity types detected by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    EmailAddress,
    PhoneNumber,
    UsSsn,
    CreditCard,
    IpAddress,
    Url,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        EntityType::EmailAddress,
        EntityType::PhoneNumber,
        EntityType::UsSsn,
        EntityType::CreditCard,
        EntityType::IpAddress,
        EntityType::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::EmailAddress => "EMAIL_ADDRESS",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::UsSsn => "US_SSN",
            EntityType::CreditCard => "CREDIT_CARD",
            EntityType::IpAddress => "IP_ADDRESS",
            EntityType::Url => "URL",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected entity, byte offsets into the analyzed text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PiiSpan {
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

impl PiiSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn overlaps(&self, other: &PiiSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

struct PatternRecognizer {
    entity_type: EntityType,
    pattern: &'static Regex,
    score: f32,
    validator: Option<fn(&str) -> bool>,
}

impl PatternRecognizer {
    fn for_entity(entity_type: EntityType) -> Self {
        let (pattern, score, validator): (&'static Regex, f32, Option<fn(&str) -> bool>) =
            match entity_type {
                EntityType::EmailAddress => (&EMAIL, 1.0, None),
                EntityType::CreditCard => (&CREDIT_CARD, 1.0, Some(luhn_valid)),
                EntityType::IpAddress => (&IP_ADDRESS, 0.95, None),
                EntityType::UsSsn => (&US_SSN, 0.85, Some(ssn_valid)),
                EntityType::PhoneNumber => (&PHONE, 0.75, None),
                EntityType::Url => (&URL, 0.6, None),
            };

        Self {
            entity_type,
            pattern,
            score,
            validator,
        }
    }

    fn scan(&self, text: &str, out: &mut Vec<PiiSpan>) {
        for m in self.pattern.find_iter(text) {
            if let Some(validate) = self.validator {
                if !validate(m.as_str()) {
                    continue;
                }
            }
            out.push(PiiSpan {
                entity_type: self.entity_type,
                start: m.start(),
                end: m.end(),
                score: self.score,
            });
        }
    }
}

/// Detects PII entities in free text
pub struct PiiAnalyzer {
    recognizers: Vec<PatternRecognizer>,
}

impl Default for PiiAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PiiAnalyzer {
    /// Analyzer with every supported recognizer
    pub fn new() -> Self {
        Self::with_entities(&EntityType::ALL)
    }

    /// Analyzer restricted to the given entity types
    pub fn with_entities(entities: &[EntityType]) -> Self {
        let recognizers = entities
            .iter()
            .map(|&entity| PatternRecognizer::for_entity(entity))
            .collect();
        Self { recognizers }
    }

    pub fn entities(&self) -> Vec<EntityType> {
        self.recognizers.iter().map(|r| r.entity_type).collect()
    }

    /// Non-overlapping detected spans ordered by start offset
    pub fn analyze(&self, text: &str) -> Vec<PiiSpan> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for recognizer in &self.recognizers {
            recognizer.scan(text, &mut candidates);
        }

        resolve_overlaps(candidates)
    }
}

fn resolve_overlaps(mut candidates: Vec<PiiSpan>) -> Vec<PiiSpan> {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.start.cmp(&b.start))
    });

    let mut accepted: Vec<PiiSpan> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !accepted.iter().any(|kept| kept.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|span| span.start);
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(spans: &[PiiSpan]) -> Vec<EntityType> {
        spans.iter().map(|s| s.entity_type).collect()
    }

    #[test]
    fn test_detects_email() {
        let analyzer = PiiAnalyzer::new();
        let text = "Contact jane@example.org for access";
        let spans = analyzer.analyze(text);

        assert_eq!(types(&spans), [EntityType::EmailAddress]);
        assert_eq!(&text[spans[0].start..spans[0].end], "jane@example.org");
    }

    #[test]
    fn test_clean_text() {
        let analyzer = PiiAnalyzer::new();
        assert!(analyzer.analyze("Fasting glucose cohort, 120 subjects").is_empty());
        assert!(analyzer.analyze("").is_empty());
    }

    #[test]
    fn test_multiple_entities_ordered() {
        let analyzer = PiiAnalyzer::new();
        let spans = analyzer.analyze("ssn 123-45-6789, phone (555) 123-4567, ip 10.0.0.1");

        assert_eq!(
            types(&spans),
            [
                EntityType::UsSsn,
                EntityType::PhoneNumber,
                EntityType::IpAddress
            ]
        );
    }

    #[test]
    fn test_card_beats_phone() {
        let analyzer = PiiAnalyzer::new();
        let spans = analyzer.analyze("card 4111-1111-1111-1111");
        assert_eq!(types(&spans), [EntityType::CreditCard]);
    }

    #[test]
    fn test_invalid_card_not_reported() {
        let analyzer = PiiAnalyzer::with_entities(&[EntityType::CreditCard]);
        assert!(analyzer.analyze("4111 1111 1111 1112").is_empty());
    }

    #[test]
    fn test_restricted_entities() {
        let analyzer = PiiAnalyzer::with_entities(&[EntityType::Url]);
        assert_eq!(analyzer.entities(), [EntityType::Url]);
        assert!(analyzer.analyze("jane@example.org").is_empty());
        assert_eq!(analyzer.analyze("see https://example.org").len(), 1);
    }

    #[test]
    fn test_resolve_prefers_score_then_length() {
        let low_long = PiiSpan { entity_type: EntityType::Url, start: 0, end: 20, score: 0.5 };
        let high_short = PiiSpan { entity_type: EntityType::EmailAddress, start: 5, end: 10, score: 1.0 };
        let same_score_longer = PiiSpan { entity_type: EntityType::PhoneNumber, start: 12, end: 30, score: 0.75 };
        let same_score_shorter = PiiSpan { entity_type: EntityType::UsSsn, start: 12, end: 20, score: 0.75 };

        let resolved = resolve_overlaps(vec![low_long, same_score_shorter, high_short, same_score_longer]);
        assert_eq!(resolved, vec![high_short, same_score_longer]);
    }

    #[test]
    fn test_entity_names() {
        assert_eq!(EntityType::UsSsn.to_string(), "US_SSN");
        assert_eq!(
            serde_json::to_string(&EntityType::EmailAddress).unwrap(),
            "\"EMAIL_ADDRESS\""
        );
    }
}
