// Participation grading criteria
use lazy_static::lazy_static;
use regex::Regex;

use crate::patterns::{contains_any, sentences};
use crate::rules::{RuleContext, Verdict};

const EVALUATION_TERMS: &[&str] = &[
    "evaluated",
    "assessed",
    "graded on",
    "based on",
    "rubric",
    "criteria",
    "contribution",
    "contribute",
    "discussion",
    "attendance",
    "in-class activities",
];

lazy_static! {
    static ref GRADED_PARTICIPATION: Regex = Regex::new(
        r"(?i)\bparticipation\b[^\n%]{0,60}?\d{1,3}(?:\.\d+)?\s*%|\d{1,3}(?:\.\d+)?\s*%[^\n%]{0,30}?\bparticipation\b"
    )
    .unwrap();
    static ref PARTICIPATION: Regex = Regex::new(r"(?i)\b(?:participation|engagement)\b").unwrap();
}

pub fn check_participation(ctx: &RuleContext<'_>) -> Option<Verdict> {
    if !GRADED_PARTICIPATION.is_match(ctx.text()) {
        return Some(Verdict::not_applicable(
            0.8,
            "Participation is not part of the grade.",
        ));
    }

    let (offset, sentence) = sentences(ctx.text()).into_iter().find(|(_, sentence)| {
        PARTICIPATION.is_match(sentence)
            && contains_any(&sentence.to_ascii_lowercase(), EVALUATION_TERMS)
    })?;
    let lower = sentence.to_ascii_lowercase();
    let terms: Vec<&str> = EVALUATION_TERMS
        .iter()
        .copied()
        .filter(|term| lower.contains(term))
        .chain(["participation"])
        .collect();
    Some(
        Verdict::present(0.85, "The outline explains how participation is evaluated.")
            .quoting(ctx, offset, offset + sentence.len())
            .with_terms(terms),
    )
}
