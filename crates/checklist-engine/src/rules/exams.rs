// Exam logistics: timing, location, format and permitted materials
use lazy_static::lazy_static;
use regex::Regex;

use crate::patterns::{contains_any, sentences};
use crate::rules::{RuleContext, Verdict};

/// Detail categories; an exam needs two of them to count as described
const DETAIL_GROUPS: &[(&str, &[&str])] = &[
    ("timing", &["time", "duration", "length", "minutes", "hours", "scheduled", "date"]),
    ("location", &["location", "room", "venue", "in-person", "in person", "online"]),
    ("format", &["format", "structure", "multiple choice", "short answer", "essay", "questions"]),
    ("materials", &["allowed", "permitted", "open book", "closed book", "calculator", "notes"]),
    ("technology", &["technology", "computer", "device", "laptop", "proctor"]),
];

const MIN_DETAILS: usize = 2;

lazy_static! {
    static ref FINAL_EXAM: Regex = Regex::new(r"(?i)\bfinal\s+exam").unwrap();
    static ref MIDTERM_OR_QUIZ: Regex =
        Regex::new(r"(?i)\b(?:mid-?term|quiz(?:zes)?|tests?)\b").unwrap();
}

pub fn check_final_exam_details(ctx: &RuleContext<'_>) -> Option<Verdict> {
    check_exam_details(ctx, &FINAL_EXAM, "final exam")
}

pub fn check_midterm_details(ctx: &RuleContext<'_>) -> Option<Verdict> {
    check_exam_details(ctx, &MIDTERM_OR_QUIZ, "midterm or quiz")
}

fn check_exam_details(ctx: &RuleContext<'_>, exam: &Regex, label: &str) -> Option<Verdict> {
    if !exam.is_match(ctx.text()) {
        return Some(Verdict::not_applicable(
            0.85,
            format!("No {label} is listed in the outline."),
        ));
    }

    let exam_sentences: Vec<(usize, &str)> = sentences(ctx.text())
        .into_iter()
        .filter(|(_, sentence)| exam.is_match(sentence))
        .collect();
    let joined = exam_sentences
        .iter()
        .map(|(_, s)| s.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let covered: Vec<&str> = DETAIL_GROUPS
        .iter()
        .filter(|(_, terms)| contains_any(&joined, terms))
        .map(|(name, _)| *name)
        .collect();
    if covered.len() < MIN_DETAILS {
        return None;
    }

    let (first, _) = exam_sentences.first()?;
    let (last, last_text) = exam_sentences.last()?;
    Some(
        Verdict::present(
            0.85,
            format!("The {label} details cover {}.", covered.join(", ")),
        )
        .quoting(ctx, *first, last + last_text.len())
        .with_terms(covered),
    )
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::run;
    use shared_types::MatchStatus;

    const FINAL_ITEM: &str = "Final Exam Details: If a Final Exam is listed, does the outline include \
        information on timing, location, modality, and permitted materials?";
    const MIDTERM_ITEM: &str = "Midterm/Quiz Information: For any midterms or quizzes, is information \
        provided about timing, location, format, and permitted materials?";

    #[test]
    fn test_final_exam_with_two_details() {
        let text = "The final exam is 3 hours long. The final exam is closed book and held in room ST 140.";
        let verdict = run(FINAL_ITEM, text).unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        assert!(verdict.explanation.contains("timing"));
    }

    #[test]
    fn test_no_final_exam_is_not_applicable() {
        let verdict = run(FINAL_ITEM, "Assessment is by project only.").unwrap();
        assert_eq!(verdict.status, MatchStatus::NotApplicable);
    }

    #[test]
    fn test_bare_mention_falls_through() {
        assert_eq!(run(FINAL_ITEM, "There is a final exam."), None);
    }

    #[test]
    fn test_midterm_details() {
        let text = "The midterm is a 75 minutes multiple choice test held online.";
        let verdict = run(MIDTERM_ITEM, text).unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        let none = run(MIDTERM_ITEM, "Essays only.").unwrap();
        assert_eq!(none.status, MatchStatus::NotApplicable);
    }
}
