// Percentage extraction for grade tables, group work and final exam weight
use lazy_static::lazy_static;
use regex::Regex;

use crate::document::PreparedDocument;
use crate::patterns::ceil_boundary;

const GRADE_TABLE_SPAN: usize = 1500;

lazy_static! {
    static ref PERCENT: Regex = Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").unwrap();

    /// "Group Project: 45%", "team presentation (worth 20%)"
    static ref GROUP_THEN_PERCENT: Regex =
        Regex::new(r"(?i)\b(?:group|team)\b[^\n%]{0,60}?(\d{1,3}(?:\.\d+)?)\s*%").unwrap();

    /// "45% group project", "20% - team report"
    static ref PERCENT_THEN_GROUP: Regex = Regex::new(
        r"(?i)(\d{1,3}(?:\.\d+)?)\s*%[ \t]*[-:(–]?[ \t]*(?:for[ \t]+)?(?:the[ \t]+)?\b(?:group|team)\b"
    )
    .unwrap();

    static ref FINAL_EXAM_THEN_PERCENT: Regex =
        Regex::new(r"(?i)\bfinal\s+exam(?:ination)?\b[^\n%]{0,60}?(\d{1,3}(?:\.\d+)?)\s*%").unwrap();

    static ref PERCENT_THEN_FINAL_EXAM: Regex =
        Regex::new(r"(?i)(\d{1,3}(?:\.\d+)?)\s*%[^\n%]{0,30}?\bfinal\s+exam").unwrap();

    /// "A+ = 90", "B: 75-79", "A | 85%"
    static ref LETTER_THEN_NUMBER: Regex = Regex::new(
        r"(?m)(?:^|[\s|(])(?:[A-D][+-]?|F)(?:[ \t]*(?:=|:|-|–|\|)[ \t]*|[ \t]+)\d{1,3}(?:\.\d+)?"
    )
    .unwrap();

    /// "90-100% A+", "85 to 89 A"
    static ref RANGE_THEN_LETTER: Regex = Regex::new(
        r"\d{1,3}(?:\.\d+)?\s*%?\s*(?:-|–|to)\s*\d{1,3}(?:\.\d+)?\s*%?[ \t]*(?:=|:|\|)?[ \t]*(?:[A-D][+-]?|F)\b"
    )
    .unwrap();

    /// A short line introducing a grade or weight table
    static ref GRADE_TABLE_HEADER: Regex = Regex::new(
        r"(?im)^[ \t#*]*(?:[A-Za-z]+[ \t]+){0,3}(?:grade[ \t]+distribution|grading|assessments?|evaluation|weights?|weighting|marks[ \t]+breakdown|course[ \t]+components)\b[^\n]{0,40}$"
    )
    .unwrap();
}

/// A number found in the text with the byte range of the whole match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentage {
    pub value: f64,
    pub start: usize,
    pub end: usize,
}

fn captures(re: &Regex, text: &str) -> Vec<Percentage> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
            Some(Percentage {
                value,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Every "N%" in the text
pub fn percentages(text: &str) -> Vec<Percentage> {
    captures(&PERCENT, text)
}

/// Percentages attached to group or team work. Forward matches win; the
/// reverse form is tried only when no forward match exists.
pub fn group_work_percentages(text: &str) -> Vec<Percentage> {
    let forward = captures(&GROUP_THEN_PERCENT, text);
    if forward.is_empty() {
        captures(&PERCENT_THEN_GROUP, text)
    } else {
        forward
    }
}

/// First percentage attached to "final exam"
pub fn final_exam_percentage(text: &str) -> Option<Percentage> {
    captures(&FINAL_EXAM_THEN_PERCENT, text)
        .into_iter()
        .next()
        .or_else(|| captures(&PERCENT_THEN_FINAL_EXAM, text).into_iter().next())
}

/// Number of letter-grade to number mappings
pub fn letter_grade_mappings(text: &str) -> usize {
    LETTER_THEN_NUMBER
        .find_iter(text)
        .count()
        .max(RANGE_THEN_LETTER.find_iter(text).count())
}

/// Byte range of the grade table: from a grade/weight header line through
/// the rows that follow it, ending at the first line without a number once
/// a percentage row has been seen, or after `GRADE_TABLE_SPAN` bytes
pub fn grade_table_region(doc: &PreparedDocument) -> Option<(usize, usize)> {
    let text = doc.text();
    let header = GRADE_TABLE_HEADER.find(text)?;
    let start = header.start();
    let limit = ceil_boundary(text, start + GRADE_TABLE_SPAN).max(header.end());

    let mut end = header.end();
    let mut seen_row = false;
    for line in text[header.end()..limit].split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            end += line.len();
            continue;
        }
        let has_number = trimmed.chars().any(|c| c.is_ascii_digit());
        if seen_row && !has_number {
            break;
        }
        seen_row |= PERCENT.is_match(trimmed);
        end += line.len();
    }
    seen_row.then_some((start, end.min(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::Segmenter;
    use pretty_assertions::assert_eq;

    fn values(found: &[Percentage]) -> Vec<f64> {
        found.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_percentages() {
        assert_eq!(values(&percentages("a 10% b 12.5 % c")), vec![10.0, 12.5]);
    }

    #[test]
    fn test_group_work_forward() {
        assert_eq!(values(&group_work_percentages("Group Project: 45%")), vec![45.0]);
        assert_eq!(
            values(&group_work_percentages("Team presentation (worth 20%)")),
            vec![20.0]
        );
    }

    #[test]
    fn test_group_work_reverse() {
        assert_eq!(values(&group_work_percentages("30% - group report")), vec![30.0]);
        assert!(group_work_percentages("Midterm 30%\nEssay 20%").is_empty());
    }

    #[test]
    fn test_final_exam_prefers_forward_match() {
        let text = "Midterm 30%, Final Exam 40%";
        assert_eq!(final_exam_percentage(text).map(|p| p.value), Some(40.0));
        let text = "55% of your grade is the final exam";
        assert_eq!(final_exam_percentage(text).map(|p| p.value), Some(55.0));
        assert_eq!(final_exam_percentage("final exam in April"), None);
    }

    #[test]
    fn test_letter_grade_mappings() {
        let table = "A+ = 95\nA = 90\nA- = 85\nB+ = 80\n";
        assert_eq!(letter_grade_mappings(table), 4);
        let ranges = "90-100% A+\n85-89% A\n80-84% A-";
        assert!(letter_grade_mappings(ranges) >= 3);
        assert!(letter_grade_mappings("A short sentence with 3 apples") < 3);
    }

    #[test]
    fn test_grade_table_region() {
        let text = "Intro\nwelcome.\nGrade Distribution\nQuizzes 20%\nExam 40%\nLate Policy\nnone.";
        let doc = PreparedDocument::new(text, &Segmenter::default());
        let (start, end) = grade_table_region(&doc).unwrap();
        assert!(text[start..end].starts_with("Grade Distribution"));
        assert!(text[start..end].contains("Exam 40%"));
        assert!(!text[start..end].contains("Late Policy"));
    }

    #[test]
    fn test_grade_table_region_needs_a_percentage_row() {
        let doc = PreparedDocument::new("Grading\nsee the syllabus.\n", &Segmenter::default());
        assert_eq!(grade_table_region(&doc), None);
    }

    #[test]
    fn test_letter_mapping_ignores_platform_names() {
        assert_eq!(letter_grade_mappings("Submit on D2L by Friday"), 0);
    }
}
