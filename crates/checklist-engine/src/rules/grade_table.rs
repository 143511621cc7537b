// Grade distribution table and letter-grade scale
use crate::extractors::numeric::{grade_table_region, letter_grade_mappings, percentages};
use crate::rules::{RuleContext, Verdict};

const MIN_WEIGHTED_ROWS: usize = 2;
const MIN_GRADE_MAPPINGS: usize = 3;

pub fn check_grade_distribution(ctx: &RuleContext<'_>) -> Option<Verdict> {
    let (start, end) = grade_table_region(ctx.doc)?;
    let weights = percentages(&ctx.text()[start..end]);
    if weights.len() < MIN_WEIGHTED_ROWS {
        return None;
    }
    Some(
        Verdict::present(
            0.9,
            format!("A grade distribution lists {} weighted assessments.", weights.len()),
        )
        .quoting(ctx, start, end)
        .with_terms(["grade distribution", "%"]),
    )
}

pub fn check_grading_scale(ctx: &RuleContext<'_>) -> Option<Verdict> {
    let mappings = letter_grade_mappings(ctx.text());
    if mappings < MIN_GRADE_MAPPINGS {
        return None;
    }
    let anchor = ctx
        .lower()
        .find("grade scale")
        .or_else(|| ctx.lower().find("grading scale"))
        .unwrap_or(0);
    Some(
        Verdict::present(
            0.9,
            format!("A grading scale maps {mappings} letter grades to percentages."),
        )
        .quoting(ctx, anchor, anchor)
        .with_terms(["grade scale", "letter grade"]),
    )
}
