//! Plain-text rendering of an analysis run

use std::fmt::Write;

use shared_types::{AnalysisRun, MatchResult};

const ITEM_WIDTH: usize = 72;

/// One row per item followed by the summary counts
pub fn render_table(run: &AnalysisRun) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<8} {:>6}  {:<14} {}",
        "#", "STATUS", "CONF", "METHOD", "ITEM"
    );
    for (index, result) in run.results.iter().enumerate() {
        let _ = writeln!(out, "{}", render_row(index + 1, result));
    }

    let summary = &run.summary;
    let _ = writeln!(
        out,
        "\n{} items: {} present, {} missing, {} not applicable",
        summary.total, summary.present, summary.missing, summary.not_applicable
    );
    if run.oracle_consulted {
        let _ = writeln!(out, "Oracle consulted");
    }
    out
}

fn render_row(number: usize, result: &MatchResult) -> String {
    format!(
        "{:<4} {:<8} {:>5.0}%  {:<14} {}",
        number,
        result.status.to_string(),
        result.confidence * 100.0,
        result.method.to_string(),
        truncate(&result.item.text, ITEM_WIDTH)
    )
}

/// Cut at a char boundary and mark the cut with "..."
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{ChecklistItem, DetectionMethod, ItemCategory, MatchStatus};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn result(text: &str, status: MatchStatus, confidence: f64) -> MatchResult {
        MatchResult {
            item: Arc::new(ChecklistItem {
                text: text.to_string(),
                concepts: BTreeSet::new(),
                keywords: Vec::new(),
                category: ItemCategory::Standard,
            }),
            present: status == MatchStatus::Present,
            confidence,
            status,
            evidence: String::new(),
            evidence_position: None,
            matched_terms: BTreeSet::new(),
            method: DetectionMethod::SpecialCase,
            explanation: String::new(),
            criterion_met: None,
        }
    }

    #[test]
    fn test_row_layout() {
        let row = render_row(3, &result("Late policy", MatchStatus::NotApplicable, 0.9));
        assert_eq!(row, "3    N/A         90%  special-case   Late policy");
    }

    #[test]
    fn test_long_items_are_truncated() {
        let long = "word ".repeat(40);
        let cut = truncate(&long, 20);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= 20);
        assert_eq!(truncate("short", 20), "short");
    }

    #[test]
    fn test_table_has_summary() {
        let run = AnalysisRun::new(
            vec![
                result("Instructor email", MatchStatus::Present, 0.95),
                result("Late policy", MatchStatus::Missing, 0.2),
            ],
            1200,
            false,
        );
        let table = render_table(&run);
        assert_eq!(table.lines().count(), 5);
        assert!(table.contains("2 items: 1 present, 1 missing, 0 not applicable"));
        assert!(!table.contains("Oracle consulted"));
    }
}
