// Late submission policy
//
// Lateness terms match whole words only ("latest" is not late).
// Three passes with falling confidence:
//   a) a sentence naming late submissions that states a penalty
//   b) a policy section with two late terms and a penalty indicator
//   c) an assignment section mentioning "late" next to a penalty term
use lazy_static::lazy_static;
use regex::Regex;

use crate::patterns::{
    contains_any, contains_any_word, contains_term, contains_word, count_distinct_words, sentences,
    ASSIGNMENT_TITLE_TERMS, LATE_TERMS, PENALTY_TERMS, POLICY_TITLE_TERMS,
};
use crate::rules::{RuleContext, Verdict};

lazy_static! {
    static ref LATE_LABEL: Regex = Regex::new(
        r"(?i)\blate[\s-]+(?:submission|assignment|work|penalt|polic|paper|report|deliverable|hand)|\b(?:submitted|handed\s+in|received|turned\s+in)\s+late\b"
    )
    .unwrap();

    static ref PENALTY_INDICATOR: Regex = Regex::new(
        r"(?i)\d{1,3}(?:\.\d+)?\s*%|grade\s+reduction|\bzero\b|\bdeduct|\bpenal"
    )
    .unwrap();
}

pub fn check_late_policy(ctx: &RuleContext<'_>) -> Option<Verdict> {
    let lower = ctx.lower();
    if !contains_any_word(lower, LATE_TERMS) {
        return Some(Verdict::missing(
            0.95,
            "The outline never mentions late submissions.",
        ));
    }

    // a) labelled sentence with a penalty
    for (offset, sentence) in sentences(ctx.text()) {
        let sentence_lower = sentence.to_ascii_lowercase();
        if LATE_LABEL.is_match(sentence) && contains_any(&sentence_lower, PENALTY_TERMS) {
            return Some(
                Verdict::present(0.95, "A late-submission statement sets out a penalty.")
                    .quoting(ctx, offset, offset + sentence.len())
                    .with_terms(matched(&sentence_lower)),
            );
        }
    }

    // b) policy section
    for section in ctx.doc.headed_sections() {
        let title = section.title.to_ascii_lowercase();
        if !contains_any(&title, POLICY_TITLE_TERMS) {
            continue;
        }
        let body = ctx.doc.section_lower(section);
        if count_distinct_words(body, LATE_TERMS) >= 2 && PENALTY_INDICATOR.is_match(body) {
            return Some(
                Verdict::present(0.85, format!("The \"{}\" section covers late work and penalties.", section.title))
                    .quoting(ctx, section.start_offset, section.end_offset)
                    .with_terms(matched(body)),
            );
        }
    }

    // c) assignment context
    for section in ctx.doc.headed_sections() {
        let title = section.title.to_ascii_lowercase();
        let body = ctx.doc.section_lower(section);
        let assignment_context =
            contains_any(&title, ASSIGNMENT_TITLE_TERMS) || contains_term(body, "assignment");
        if assignment_context && contains_word(body, "late") && contains_any(body, PENALTY_TERMS) {
            return Some(
                Verdict::present(0.8, format!("The \"{}\" section mentions late penalties.", section.title))
                    .quoting(ctx, section.start_offset, section.end_offset)
                    .with_terms(matched(body)),
            );
        }
    }

    Some(Verdict::missing(
        0.95,
        "Late submissions are mentioned but no penalty policy was found.",
    ))
}

fn matched(lower: &str) -> Vec<&'static str> {
    let late = LATE_TERMS.iter().filter(|term| contains_word(lower, term));
    let penalty = PENALTY_TERMS
        .iter()
        .filter(|term| **term != "%" && contains_term(lower, term));
    late.chain(penalty).copied().collect()
}
