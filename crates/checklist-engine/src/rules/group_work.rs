// Group work weight ceiling and group project guidelines
use lazy_static::lazy_static;
use regex::Regex;

use crate::extractors::numeric::{grade_table_region, group_work_percentages, Percentage};
use crate::patterns::contains_any;
use crate::rules::{RuleContext, Verdict};

const GROUP_TERMS: &[&str] = &["group", "team", "collaborative"];

lazy_static! {
    static ref GROUP_PROJECT: Regex =
        Regex::new(r"(?i)\b(?:group|team)\b[^\n.]{0,40}?\b(?:project|assignment|work|presentation|report)").unwrap();

    static ref GROUP_DETAILS: Regex = Regex::new(
        r"(?i)\b(?:group|team)\b[^\n]{0,120}?\b(?:expectation|guideline|instruction|due|deadline|peer evaluation|formation|formed|roles?)\b"
    )
    .unwrap();
}

/// Group work must not exceed the configured share of the final grade
pub fn check_group_work_weight(ctx: &RuleContext<'_>) -> Option<Verdict> {
    if !contains_any(ctx.lower(), GROUP_TERMS) {
        return Some(Verdict::not_applicable(
            0.9,
            "No group work is mentioned in the outline.",
        ));
    }

    // Prefer the grade table; fall back to the whole document
    let (offset, found) = match grade_table_region(ctx.doc) {
        Some((start, end)) => {
            let found = group_work_percentages(&ctx.text()[start..end]);
            if found.is_empty() {
                (0, group_work_percentages(ctx.text()))
            } else {
                (start, found)
            }
        }
        None => (0, group_work_percentages(ctx.text())),
    };

    let heaviest: &Percentage = found
        .iter()
        .max_by(|a, b| a.value.total_cmp(&b.value))?;
    let ceiling = ctx.config.group_work_ceiling;
    let (start, end) = (offset + heaviest.start, offset + heaviest.end);

    let verdict = if heaviest.value <= ceiling {
        Verdict::present(
            0.9,
            format!(
                "Group work is weighted {}%, within the {}% ceiling.",
                heaviest.value, ceiling
            ),
        )
        .with_criterion(true)
    } else {
        Verdict::missing(
            0.9,
            format!(
                "Group work is weighted {}%, above the {}% ceiling.",
                heaviest.value, ceiling
            ),
        )
        .with_criterion(false)
    };
    Some(
        verdict
            .quoting(ctx, start, end)
            .with_terms([format!("{}%", heaviest.value)]),
    )
}

/// A listed group project needs guidelines; no group project means N/A
pub fn check_group_project(ctx: &RuleContext<'_>) -> Option<Verdict> {
    if !GROUP_PROJECT.is_match(ctx.text()) {
        return Some(Verdict::not_applicable(
            0.85,
            "No group project is listed in the outline.",
        ));
    }
    // Quote only the line that holds the details
    let details = GROUP_DETAILS.find(ctx.text())?;
    Some(
        Verdict::present(0.85, "Group project guidelines or deadlines are described.")
            .quoting(ctx, details.start(), details.end())
            .with_terms(["group", "team", "deadline", "due"]),
    )
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::run;
    use shared_types::MatchStatus;

    const ITEM: &str =
        "Group Work Weight: If group work is included, verify it doesn't exceed 40% of the overall final grade.";
    const PROJECT_ITEM: &str = "Group Project Guidelines: If a group project is listed, are details \
        provided including the first group work deadline?";

    #[test]
    fn test_group_project_above_ceiling_is_missing() {
        let verdict = run(ITEM, "Grade Distribution\nGroup Project: 45%\nFinal Exam: 30%").unwrap();
        assert_eq!(verdict.status, MatchStatus::Missing);
        assert_eq!(verdict.criterion_met, Some(false));
        assert!(verdict.evidence.contains("45%"));
    }

    #[test]
    fn test_group_project_within_ceiling_is_present() {
        let verdict = run(ITEM, "Group Project: 20%").unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        assert_eq!(verdict.criterion_met, Some(true));
    }

    #[test]
    fn test_exactly_at_ceiling_is_present() {
        let verdict = run(ITEM, "Team presentation 40%").unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
    }

    #[test]
    fn test_no_group_mention_is_not_applicable() {
        let verdict = run(ITEM, "Essay 30%\nFinal Exam 40%\nAll work is individual.").unwrap();
        assert_eq!(verdict.status, MatchStatus::NotApplicable);
        assert!(!verdict.is_present());
    }

    #[test]
    fn test_group_without_percentage_falls_through() {
        assert_eq!(run(ITEM, "Students may form study groups."), None);
    }

    #[test]
    fn test_table_value_wins_over_prose() {
        let text = "Group work used to be worth 60% in earlier years.\n\
                    Grade Distribution\nGroup Report 25%\nExam 40%\n";
        let verdict = run(ITEM, text).unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        assert!(verdict.evidence.contains("25%"));
    }

    #[test]
    fn test_group_project_details() {
        let text = "Group project: teams of four. Group formation is due by Sept 20.";
        let verdict = run(PROJECT_ITEM, text).unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        let none = run(PROJECT_ITEM, "Individual essays only.").unwrap();
        assert_eq!(none.status, MatchStatus::NotApplicable);
        assert_eq!(run(PROJECT_ITEM, "There is a group project."), None);
    }

    #[test]
    fn test_group_project_evidence_is_the_details_line() {
        let filler = "Readings are posted weekly.\n".repeat(30);
        let text = format!(
            "Group project worth 20%.\n{filler}Each group must meet the deadline of Oct 3.\n"
        );
        let verdict = run(PROJECT_ITEM, &text).unwrap();
        assert_eq!(verdict.status, MatchStatus::Present);
        assert_eq!(verdict.evidence, "Each group must meet the deadline of Oct 3.");
        assert!(!verdict.evidence.contains("Readings"));
    }
}
