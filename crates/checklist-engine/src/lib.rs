//! Heuristic checklist-compliance matching for course outlines
//!
//! Every item is decided by the first stage that reaches a verdict:
//!
//! 1. a not-applicable declaration in the caller's additional context
//! 2. the item text appearing verbatim in the document
//! 3. the special-case rules registered for the item's concept
//! 4. the generic scorer (keyword coverage, phrases, section placement)
//!
//! [`ChecklistEngine`] runs this synchronously and deterministically;
//! [`Analyzer`] runs it on a worker pool and folds in an optional oracle.
//!
//! ```
//! use checklist_engine::{ChecklistEngine, Config};
//!
//! let engine = ChecklistEngine::new(Config::default());
//! let run = engine.analyze_text(
//!     &["Late Submission Policy: Are penalties for late submissions explained?"],
//!     "Late Policy\nLate submissions will be penalized 5% per day.",
//!     "",
//! );
//! assert_eq!(run.summary.present, 1);
//! ```

pub mod analyzer;
pub mod applicability;
pub mod checklist;
pub mod config;
pub mod document;
pub mod evidence;
pub mod extractors;
pub mod interpreter;
pub mod lexicon;
pub mod oracle;
pub mod patterns;
pub mod rules;
pub mod scoring;
pub mod segmenter;
pub mod taxonomy;

use std::sync::Arc;

use shared_types::{AnalysisRun, ChecklistItem, DetectionMethod, MatchResult, MatchStatus};
use tracing::debug;

pub use analyzer::Analyzer;
pub use checklist::{builtin_checklist, parse_checklist};
pub use config::Config;
pub use document::PreparedDocument;
pub use oracle::{HttpOracle, Oracle, OracleError, OracleVerdict};
pub use taxonomy::Taxonomy;

use crate::evidence::EvidenceExtractor;
use crate::interpreter::Interpreter;
use crate::lexicon::Stopwords;
use crate::rules::{RuleContext, Verdict};
use crate::scoring::Scorer;
use crate::segmenter::Segmenter;

/// A result plus whether the stage that produced it outranks the oracle
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
    pub result: MatchResult,
    pub authoritative: bool,
}

/// Deterministic matcher; immutable once built and cheap to share
#[derive(Debug, Clone)]
pub struct ChecklistEngine {
    config: Arc<Config>,
    taxonomy: Arc<Taxonomy>,
    stopwords: Arc<Stopwords>,
    interpreter: Interpreter,
    segmenter: Segmenter,
}

impl ChecklistEngine {
    /// Engine over the built-in course-outline taxonomy
    pub fn new(config: Config) -> Self {
        Self::with_taxonomy(config, Taxonomy::builtin())
    }

    pub fn with_taxonomy(config: Config, taxonomy: Taxonomy) -> Self {
        let stopwords = Arc::new(Stopwords::load(config.stopwords_path.as_deref()));
        let taxonomy = Arc::new(taxonomy);
        Self {
            interpreter: Interpreter::new(taxonomy.clone(), stopwords.clone()),
            segmenter: Segmenter::new(config.segmenter.clone()),
            config: Arc::new(config),
            taxonomy,
            stopwords,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn prepare(&self, text: &str) -> PreparedDocument {
        PreparedDocument::new(text, &self.segmenter)
    }

    /// Evaluate every item against `text`. An empty document or checklist
    /// yields an empty run.
    pub fn analyze_text<S: AsRef<str>>(&self, items: &[S], text: &str, context: &str) -> AnalysisRun {
        if items.is_empty() || text.trim().is_empty() {
            debug!(items = items.len(), "nothing to analyze");
            return AnalysisRun::empty();
        }
        let doc = self.prepare(text);
        let results = self
            .interpreter
            .interpret_all(items)
            .iter()
            .map(|item| self.evaluate_item(item, &doc, context))
            .collect();
        AnalysisRun::new(results, doc.char_count(), false)
    }

    pub fn evaluate_item(
        &self,
        item: &Arc<ChecklistItem>,
        doc: &PreparedDocument,
        context: &str,
    ) -> MatchResult {
        self.evaluate(item, doc, context).result
    }

    pub(crate) fn evaluate(
        &self,
        item: &Arc<ChecklistItem>,
        doc: &PreparedDocument,
        context: &str,
    ) -> Evaluation {
        let extractor = EvidenceExtractor::new(&self.config.evidence);

        if let Some(verdict) = applicability::declared_not_applicable(context, item, &self.taxonomy)
        {
            debug!(item = %item.text, "declared not applicable by context");
            return Evaluation {
                result: from_verdict(item, verdict, None),
                authoritative: true,
            };
        }

        let scorer = Scorer::new(&self.config.scoring, &self.taxonomy, &self.stopwords);
        let searched: Vec<String> = item.keywords.iter().map(|k| k.term.clone()).collect();

        if scorer.exact_match(item, doc) {
            let mut evidence = extractor.extract(doc, &[item.text.clone()], &searched, None);
            if evidence.position.is_none() {
                evidence = extractor.extract(doc, &searched, &searched, None);
            }
            return Evaluation {
                result: MatchResult {
                    item: item.clone(),
                    present: true,
                    confidence: self.config.scoring.exact_match_confidence,
                    status: MatchStatus::Present,
                    evidence: evidence.text,
                    evidence_position: evidence.position,
                    matched_terms: [item.text.clone()].into(),
                    method: DetectionMethod::GenericScore,
                    explanation: "Item text appears verbatim in the document.".to_string(),
                    criterion_met: None,
                },
                authoritative: true,
            };
        }

        let ctx = RuleContext::new(doc, item, &self.config.rules, &self.config.evidence);
        if let Some(verdict) = rules::evaluate(&ctx) {
            debug!(item = %item.text, status = %verdict.status, "special-case verdict");
            return Evaluation {
                result: from_verdict(item, verdict, Some(&extractor)),
                authoritative: true,
            };
        }

        let outcome = scorer.score(item, doc);
        let matched: Vec<String> = outcome
            .matched_phrases
            .iter()
            .chain(&outcome.matched_terms)
            .cloned()
            .collect();
        let evidence = extractor.extract(doc, &matched, &searched, outcome.confirming_section);

        let mut explanation = outcome.explanation();
        if let Some(note) = &evidence.note {
            debug!(item = %item.text, note = %note, "empty evidence");
            explanation.push_str(&format!(" ({note})"));
        }
        let status = if outcome.present {
            MatchStatus::Present
        } else {
            MatchStatus::Missing
        };
        Evaluation {
            result: MatchResult {
                item: item.clone(),
                present: outcome.present,
                confidence: outcome.confidence,
                status,
                evidence: evidence.text,
                evidence_position: evidence.position,
                matched_terms: matched.into_iter().collect(),
                method: DetectionMethod::GenericScore,
                explanation,
                criterion_met: None,
            },
            authoritative: false,
        }
    }
}

impl Default for ChecklistEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Quoted rule evidence gets the highlight markers; context declarations
/// are passed through as written
fn from_verdict(
    item: &Arc<ChecklistItem>,
    verdict: Verdict,
    extractor: Option<&EvidenceExtractor<'_>>,
) -> MatchResult {
    let evidence = match extractor {
        Some(extractor) if verdict.position.is_some() => {
            let terms: Vec<String> = verdict.matched_terms.iter().cloned().collect();
            extractor.highlight(&verdict.evidence, &terms)
        }
        _ => verdict.evidence,
    };
    MatchResult {
        item: item.clone(),
        present: verdict.status == MatchStatus::Present,
        confidence: verdict.confidence,
        status: verdict.status,
        evidence,
        evidence_position: verdict.position,
        matched_terms: verdict.matched_terms,
        method: DetectionMethod::SpecialCase,
        explanation: verdict.explanation,
        criterion_met: verdict.criterion_met,
    }
}
