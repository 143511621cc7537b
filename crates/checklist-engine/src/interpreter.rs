//! Turns raw checklist item text into concepts, weighted keywords and a
//! threshold category.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use shared_types::{ChecklistItem, ItemCategory, WeightedTerm};

use crate::lexicon::Stopwords;
use crate::patterns::tokenize;
use crate::taxonomy::Taxonomy;

const POLICY_MARKERS: &[&str] = &["policy", "policies", "rule", "procedure"];
const CONTACT_MARKERS: &[&str] = &["contact", "email", "e-mail"];

/// Longer, more specific terms weigh more, capped at 1.0
pub fn term_weight(term: &str) -> f64 {
    (0.4 + term.chars().count() as f64 / 20.0).min(1.0)
}

#[derive(Debug, Clone)]
pub struct Interpreter {
    taxonomy: Arc<Taxonomy>,
    stopwords: Arc<Stopwords>,
}

impl Interpreter {
    pub fn new(taxonomy: Arc<Taxonomy>, stopwords: Arc<Stopwords>) -> Self {
        Self {
            taxonomy,
            stopwords,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn interpret(&self, text: &str) -> ChecklistItem {
        let text = text.trim();
        let lowered = text.to_lowercase();

        let mut concepts = BTreeSet::new();
        let terms = match self.taxonomy.classify(text) {
            Some(concept) => {
                concepts.insert(concept.to_string());
                self.taxonomy.terms(concept).unwrap_or_default().to_vec()
            }
            None => self.content_words(text),
        };

        let mut seen = HashSet::new();
        let keywords = terms
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .map(|term| WeightedTerm {
                weight: term_weight(&term),
                term,
            })
            .collect();

        ChecklistItem {
            text: text.to_string(),
            concepts,
            keywords,
            category: categorize(&lowered),
        }
    }

    pub fn interpret_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Arc<ChecklistItem>> {
        texts
            .iter()
            .map(|text| Arc::new(self.interpret(text.as_ref())))
            .collect()
    }

    /// Words longer than three characters that are not stopwords
    fn content_words(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|word| word.chars().count() > 3 && !self.stopwords.contains(word))
            .collect()
    }
}

fn categorize(lowered: &str) -> ItemCategory {
    if POLICY_MARKERS.iter().any(|m| lowered.contains(m)) {
        ItemCategory::Policy
    } else if CONTACT_MARKERS.iter().any(|m| lowered.contains(m)) {
        ItemCategory::Contact
    } else {
        ItemCategory::Standard
    }
}
