//! Generic presence scoring
//!
//! Signals, strongest first:
//! 1. the whole item text appears in the document
//! 2. weighted keyword coverage
//! 3. item phrases (2- and 3-grams) found verbatim, each adding a bonus
//! 4. a section whose title or content confirms the item
//!
//! `ratio = (matched keyword weight + phrases * bonus) / total keyword weight`
//! decides presence against the category threshold unless a section
//! confirms the item outright.

use std::collections::{BTreeSet, HashSet};

use shared_types::{ChecklistItem, Section};

use crate::config::ScoringConfig;
use crate::document::PreparedDocument;
use crate::lexicon::Stopwords;
use crate::patterns::{contains_term, normalize, tokenize, FUNCTION_BIGRAMS};
use crate::taxonomy::Taxonomy;

/// How a generic verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBasis {
    ExactText,
    Ratio,
    SectionPlacement,
    BelowThreshold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub present: bool,
    pub confidence: f64,
    pub ratio: f64,
    pub threshold: f64,
    pub basis: ScoreBasis,
    pub matched_terms: BTreeSet<String>,
    pub matched_phrases: Vec<String>,
    /// Index of the section that confirmed the item
    pub confirming_section: Option<usize>,
}

impl ScoreOutcome {
    pub fn explanation(&self) -> String {
        match self.basis {
            ScoreBasis::ExactText => "Item text appears verbatim in the document.".to_string(),
            ScoreBasis::Ratio => format!(
                "Match ratio {:.2} meets threshold {:.2} ({} terms, {} phrases).",
                self.ratio,
                self.threshold,
                self.matched_terms.len(),
                self.matched_phrases.len()
            ),
            ScoreBasis::SectionPlacement => format!(
                "A related section confirms the item (match ratio {:.2}, threshold {:.2}).",
                self.ratio, self.threshold
            ),
            ScoreBasis::BelowThreshold => format!(
                "Match ratio {:.2} is below threshold {:.2}.",
                self.ratio, self.threshold
            ),
        }
    }
}

/// Borrowed view over the immutable configuration of a run
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    config: &'a ScoringConfig,
    taxonomy: &'a Taxonomy,
    stopwords: &'a Stopwords,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a ScoringConfig, taxonomy: &'a Taxonomy, stopwords: &'a Stopwords) -> Self {
        Self {
            config,
            taxonomy,
            stopwords,
        }
    }

    /// Case-insensitive, whitespace-insensitive containment of the item text
    pub fn exact_match(&self, item: &ChecklistItem, doc: &PreparedDocument) -> bool {
        let needle = normalize(&item.text);
        !needle.is_empty() && doc.normalized().contains(&needle)
    }

    pub fn score(&self, item: &ChecklistItem, doc: &PreparedDocument) -> ScoreOutcome {
        let threshold = self.config.threshold_for(item.category);

        if self.exact_match(item, doc) {
            return ScoreOutcome {
                present: true,
                confidence: self.config.exact_match_confidence,
                ratio: 1.0,
                threshold,
                basis: ScoreBasis::ExactText,
                matched_terms: item.keywords.iter().map(|k| k.term.clone()).collect(),
                matched_phrases: Vec::new(),
                confirming_section: None,
            };
        }

        let haystack = doc.normalized();
        let mut total_weight = 0.0;
        let mut matched_weight = 0.0;
        let mut matched_terms = BTreeSet::new();
        for keyword in &item.keywords {
            total_weight += keyword.weight;
            if contains_term(haystack, &keyword.term) {
                matched_weight += keyword.weight;
                matched_terms.insert(keyword.term.clone());
            }
        }

        let matched_phrases: Vec<String> = item_phrases(&item.text, self.stopwords)
            .into_iter()
            .filter(|phrase| contains_term(haystack, phrase))
            .collect();

        let ratio = if total_weight > 0.0 {
            (matched_weight + matched_phrases.len() as f64 * self.config.phrase_bonus)
                / total_weight
        } else {
            0.0
        };

        let confirming_section = self.confirming_section(item, doc.sections());
        let by_ratio = ratio >= threshold && total_weight > 0.0;

        let (present, confidence, basis) = if by_ratio {
            let mut confidence = ratio;
            if confirming_section.is_some() {
                confidence = confidence.max(self.config.section_confidence);
            }
            (true, confidence.min(self.config.present_cap), ScoreBasis::Ratio)
        } else if confirming_section.is_some() {
            let confidence = ratio
                .max(self.config.section_confidence)
                .min(self.config.present_cap);
            (true, confidence, ScoreBasis::SectionPlacement)
        } else {
            (false, self.absent_confidence(ratio, threshold), ScoreBasis::BelowThreshold)
        };

        ScoreOutcome {
            present,
            confidence,
            ratio,
            threshold,
            basis,
            matched_terms,
            matched_phrases,
            confirming_section,
        }
    }

    /// Lower, never zero: a near miss is reported with less certainty
    fn absent_confidence(&self, ratio: f64, threshold: f64) -> f64 {
        let (floor, ceiling) = (self.config.absent_floor, self.config.absent_ceiling);
        if threshold <= 0.0 {
            return floor;
        }
        (ceiling - 0.3 * ratio / threshold).clamp(floor, ceiling)
    }

    fn confirming_section(&self, item: &ChecklistItem, sections: &[Section]) -> Option<usize> {
        sections.iter().position(|section| {
            self.title_confirms(item, section) || self.content_confirms(item, section)
        })
    }

    fn title_confirms(&self, item: &ChecklistItem, section: &Section) -> bool {
        section.is_headed()
            && !section.content.trim().is_empty()
            && item
                .concepts
                .iter()
                .any(|concept| self.taxonomy.title_signals(concept, &section.title))
    }

    fn content_confirms(&self, item: &ChecklistItem, section: &Section) -> bool {
        if item.keywords.is_empty() {
            return false;
        }
        let content = normalize(&section.content);
        let hits = item
            .keywords
            .iter()
            .filter(|k| contains_term(&content, &k.term))
            .count();
        hits as f64 / item.keywords.len() as f64 >= self.config.section_fraction
    }
}

/// Contiguous 2- and 3-word phrases of the item text that do not begin or
/// end with a stopword
pub fn item_phrases(text: &str, stopwords: &Stopwords) -> Vec<String> {
    let words = tokenize(text);
    let mut seen = HashSet::new();
    let mut phrases = Vec::new();
    for n in 2..=3 {
        for window in words.windows(n) {
            let (first, last) = (&window[0], &window[n - 1]);
            if stopwords.contains(first) || stopwords.contains(last) {
                continue;
            }
            let phrase = window.join(" ");
            if FUNCTION_BIGRAMS.contains(&phrase.as_str()) {
                continue;
            }
            if seen.insert(phrase.clone()) {
                phrases.push(phrase);
            }
        }
    }
    phrases
}
