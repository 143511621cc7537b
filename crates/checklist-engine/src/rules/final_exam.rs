// Final exam weight limit and take-home final identification
use lazy_static::lazy_static;
use regex::Regex;

use crate::extractors::numeric::final_exam_percentage;
use crate::patterns::sentences;
use crate::rules::{RuleContext, Verdict};

lazy_static! {
    static ref FINAL_EXAM: Regex = Regex::new(r"(?i)\bfinal\s+exam").unwrap();
    static ref TAKE_HOME: Regex = Regex::new(r"(?i)\btake[\s-]?home\b").unwrap();
    static ref FINAL: Regex = Regex::new(r"(?i)\bfinal\b").unwrap();
}

/// The final exam is present either way; `criterion_met` tells whether its
/// weight stays within the limit
pub fn check_final_exam_weight(ctx: &RuleContext<'_>) -> Option<Verdict> {
    if !FINAL_EXAM.is_match(ctx.text()) {
        return Some(Verdict::not_applicable(
            0.9,
            "No final exam is mentioned in the outline.",
        ));
    }

    let weight = final_exam_percentage(ctx.text())?;
    let limit = ctx.config.final_exam_limit;
    let meets = weight.value <= limit;
    let explanation = if meets {
        format!("The final exam is worth {}%, within the {}% limit.", weight.value, limit)
    } else {
        format!("The final exam is worth {}%, above the {}% limit.", weight.value, limit)
    };
    Some(
        Verdict::present(0.9, explanation)
            .with_criterion(meets)
            .quoting(ctx, weight.start, weight.end)
            .with_terms(["final exam".to_string(), format!("{}%", weight.value)]),
    )
}

pub fn check_take_home_final(ctx: &RuleContext<'_>) -> Option<Verdict> {
    if !TAKE_HOME.is_match(ctx.text()) {
        return Some(Verdict::not_applicable(
            0.8,
            "No take-home final examination is mentioned.",
        ));
    }
    let (offset, sentence) = sentences(ctx.text())
        .into_iter()
        .find(|(_, sentence)| TAKE_HOME.is_match(sentence) && FINAL.is_match(sentence))?;
    Some(
        Verdict::present(0.9, "A take-home final examination is identified.")
            .quoting(ctx, offset, offset + sentence.len())
            .with_terms(["take-home", "take home", "final"]),
    )
}
