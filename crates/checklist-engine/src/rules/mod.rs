//! Deterministic detectors for the canonical checklist categories.
//!
//! Each rule is a pure function over the prepared document. Rules are keyed
//! by concept and tried in order; the first one returning a verdict wins and
//! `None` hands the item to the generic scorer.

pub mod email;
pub mod exams;
pub mod final_exam;
pub mod grade_table;
pub mod group_work;
pub mod late_policy;
pub mod missed_assessment;
pub mod participation;

use std::collections::BTreeSet;

use shared_types::{ChecklistItem, MatchStatus, TextPosition};

use crate::config::{EvidenceConfig, RulesConfig};
use crate::document::PreparedDocument;
use crate::evidence::EvidenceExtractor;

pub type Rule = fn(&RuleContext<'_>) -> Option<Verdict>;

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub doc: &'a PreparedDocument,
    pub item: &'a ChecklistItem,
    pub config: &'a RulesConfig,
    pub evidence: &'a EvidenceConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        doc: &'a PreparedDocument,
        item: &'a ChecklistItem,
        config: &'a RulesConfig,
        evidence: &'a EvidenceConfig,
    ) -> Self {
        Self {
            doc,
            item,
            config,
            evidence,
        }
    }

    pub fn text(&self) -> &'a str {
        self.doc.text()
    }

    pub fn lower(&self) -> &'a str {
        self.doc.lower()
    }

    /// The lines of the source text covering `start..end`
    pub fn excerpt(&self, start: usize, end: usize) -> (TextPosition, String) {
        let extractor = EvidenceExtractor::new(self.evidence);
        let position = extractor.line_window(self.text(), start, end, (0, self.text().len()), 0);
        let text = self.text()[position.start_offset..position.end_offset].to_string();
        (position, text)
    }
}

/// A definitive answer from a rule
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: MatchStatus,
    pub confidence: f64,
    pub evidence: String,
    pub position: Option<TextPosition>,
    pub explanation: String,
    pub matched_terms: BTreeSet<String>,
    pub criterion_met: Option<bool>,
}

impl Verdict {
    fn new(status: MatchStatus, confidence: f64, explanation: impl Into<String>) -> Self {
        Self {
            status,
            confidence,
            evidence: String::new(),
            position: None,
            explanation: explanation.into(),
            matched_terms: BTreeSet::new(),
            criterion_met: None,
        }
    }

    pub fn present(confidence: f64, explanation: impl Into<String>) -> Self {
        Self::new(MatchStatus::Present, confidence, explanation)
    }

    pub fn missing(confidence: f64, explanation: impl Into<String>) -> Self {
        Self::new(MatchStatus::Missing, confidence, explanation)
    }

    pub fn not_applicable(confidence: f64, explanation: impl Into<String>) -> Self {
        Self::new(MatchStatus::NotApplicable, confidence, explanation)
    }

    pub fn is_present(&self) -> bool {
        self.status == MatchStatus::Present
    }

    /// Quote the source lines around `start..end`
    pub fn quoting(mut self, ctx: &RuleContext<'_>, start: usize, end: usize) -> Self {
        let (position, text) = ctx.excerpt(start, end);
        self.position = Some(position);
        self.evidence = text;
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matched_terms.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn with_criterion(mut self, met: bool) -> Self {
        self.criterion_met = Some(met);
        self
    }
}

/// Rules registered for a concept, in evaluation order
pub fn rules_for(concept: &str) -> &'static [Rule] {
    match concept {
        "instructor_email" => &[email::check_instructor_email],
        "group_work" => &[group_work::check_group_work_weight],
        "group_project" => &[group_work::check_group_project],
        "late_policy" => &[late_policy::check_late_policy],
        "missed_assessment" => &[missed_assessment::check_missed_assessment],
        "final_exam_weight" => &[final_exam::check_final_exam_weight],
        "take_home_final" => &[final_exam::check_take_home_final],
        "final_exam" => &[exams::check_final_exam_details],
        "midterm_quiz" => &[exams::check_midterm_details],
        "grade_distribution" => &[grade_table::check_grade_distribution],
        "grading_scale" => &[grade_table::check_grading_scale],
        "participation" => &[participation::check_participation],
        _ => &[],
    }
}

/// First verdict among the rules of the item's concepts
pub fn evaluate(ctx: &RuleContext<'_>) -> Option<Verdict> {
    ctx.item
        .concepts
        .iter()
        .flat_map(|concept| rules_for(concept).iter())
        .find_map(|rule| rule(ctx))
}


#[cfg(test)]
mod tests {
    use super::test_support::run;
    use super::*;

    #[test]
    fn test_item_without_rules_falls_through() {
        assert_eq!(run("Course Workload: Is there a course workload section?", "anything"), None);
        assert_eq!(run("Weekly reflection journal", "anything"), None);
    }

    #[test]
    fn test_every_builtin_concept_has_a_rule_table() {
        // Concepts without rules return an empty slice rather than panicking
        let taxonomy = crate::taxonomy::Taxonomy::builtin();
        let with_rules = taxonomy
            .concept_names()
            .filter(|name| !rules_for(name).is_empty())
            .count();
        assert_eq!(with_rules, 12);
    }

    #[test]
    fn test_verdict_builders() {
        let verdict = Verdict::present(0.9, "ok")
            .with_terms(["a", "b"])
            .with_criterion(false)
            .with_evidence("quote");
        assert!(verdict.is_present());
        assert_eq!(verdict.criterion_met, Some(false));
        assert_eq!(verdict.matched_terms.len(), 2);
        assert_eq!(verdict.evidence, "quote");
    }
}
