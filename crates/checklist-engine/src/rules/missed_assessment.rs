// Missed assessment policy
use crate::patterns::{
    contains_any, count_distinct, find_term, window, ABSENCE_TERMS, ASSESSMENT_TERMS,
    POLICY_TITLE_TERMS, PROCEDURAL_TERMS,
};
use crate::rules::{RuleContext, Verdict};

/// Distinct absence terms a policy section needs for a rule-based verdict
const MIN_DISTINCT_TERMS: usize = 3;
const PROXIMITY: usize = 150;

pub fn check_missed_assessment(ctx: &RuleContext<'_>) -> Option<Verdict> {
    let lower = ctx.lower();
    if !contains_any(lower, ABSENCE_TERMS) {
        return Some(Verdict::missing(
            0.85,
            "No missed-assessment, absence or deferral language was found.",
        ));
    }

    // Policy sections, strongest co-occurrence first
    let best = ctx
        .doc
        .headed_sections()
        .filter(|section| contains_any(&section.title.to_ascii_lowercase(), POLICY_TITLE_TERMS))
        .map(|section| (count_distinct(ctx.doc.section_lower(section), ABSENCE_TERMS), section))
        .filter(|(count, _)| *count >= MIN_DISTINCT_TERMS)
        .max_by_key(|(count, section)| (*count, std::cmp::Reverse(section.start_offset)));

    if let Some((count, section)) = best {
        let confidence = (0.8 + 0.05 * (count - MIN_DISTINCT_TERMS) as f64).min(0.95);
        let body = ctx.doc.section_lower(section);
        let terms: Vec<&str> = ABSENCE_TERMS
            .iter()
            .filter(|term| find_term(body, term).is_some())
            .map(|term| term.trim())
            .collect();
        return Some(
            Verdict::present(
                confidence,
                format!(
                    "The \"{}\" section describes missed assessments ({count} related terms).",
                    section.title
                ),
            )
            .quoting(ctx, section.start_offset, section.end_offset)
            .with_terms(terms),
        );
    }

    // Absence term near an assessment term, in procedural language
    for term in ABSENCE_TERMS {
        for (idx, _) in lower.match_indices(term) {
            let (start, nearby) = window(lower, idx, PROXIMITY);
            if contains_any(nearby, ASSESSMENT_TERMS) && contains_any(nearby, PROCEDURAL_TERMS) {
                return Some(
                    Verdict::present(
                        0.75,
                        "Absence handling for assessments is stated near the assessment details.",
                    )
                    .quoting(ctx, start, start + nearby.len())
                    .with_terms([term.trim()]),
                );
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::run;
    use shared_types::MatchStatus;

    const ITEM: &str =
        "Missed Assessment Policy: Does the outline have a missed assessment policy section?";

    #[test]
    fn test_policy_section_with_three_terms() {
        let text = "Missed Assessments\nIf you miss an exam due to illness, provide medical \
                    documentation to request a deferral.\n";
        let verdict = run(ITEM, text).unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        // miss, illness, medical, deferral
        assert!((verdict.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_proximity_fallback() {
        let text = "The midterm is in week 6. Students who are absent must notify the instructor \
                    within 48 hours.";
        let verdict = run(ITEM, text).unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        assert!((verdict.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_incidental_mention_falls_through() {
        assert_eq!(run(ITEM, "Do not be absent from the field trip."), None);
    }

    #[test]
    fn test_no_terms_is_missing() {
        let verdict = run(ITEM, "Weekly readings are posted online.").unwrap();
        assert_eq!(verdict.status, MatchStatus::Missing);
    }
}
