//! Checklist sources: list parsing and the built-in institutional checklist

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "1. item", "12) item", "a. item", "B) item"
    static ref ENUMERATED: Regex = Regex::new(r"^(?:\d{1,3}|[A-Za-z])[.)]\s+(\w.*)$").unwrap();

    static ref BULLETED: Regex =
        Regex::new(r"^[*\-+•⚫⚪○●◆◇■□▪▫➢➤➔→⇒✓✔✗✘]\s+(\w.*)$").unwrap();
}

/// Items are lines carrying a list marker, with the marker removed. When
/// the text has no markers at all, every line over ten characters is an
/// item. Duplicates are dropped and order is kept.
pub fn parse_checklist(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let marked: Vec<&str> = lines.iter().copied().filter_map(strip_marker).collect();
    let candidates = if marked.is_empty() {
        lines
            .into_iter()
            .filter(|line| line.chars().count() > 10)
            .collect()
    } else {
        marked
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty() && seen.insert(*item))
        .map(str::to_string)
        .collect()
}

fn strip_marker(line: &str) -> Option<&str> {
    ENUMERATED
        .captures(line)
        .or_else(|| BULLETED.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

const BUILTIN_CHECKLIST: &[&str] = &[
    "Instructor Email: Does the outline include the instructor's email? An acceptable email must end with \"ucalgary.ca\".",
    "Course Objectives: Are the course objectives listed and numbered?",
    "Textbooks & Other Course Material: Are any textbooks, readings, and additional course materials listed?",
    "Prohibited Materials: Check for information that details any prohibited platforms, resources, and tools that cannot be used.",
    "Course Workload: Is there a course workload section?",
    "Grading Scale: Does the course outline include the Grade Scale header and a table mapping percentages to letter grades?",
    "Grade Distribution Table: Does the course outline include a Grade Distribution statement with weights assigned to assessments?",
    "Group Work Weight: If group work is included, verify it doesn't exceed 40% of the overall final grade.",
    "Assessment-Objectives Alignment: Check that assessments indicate which course objectives each assessment measures.",
    "Due Dates in Grade Table: Does the grade distribution table include due dates for all assignments and examinations?",
    "30% Before Last Class: Will students receive AT LEAST 30% of their final grade before the last day of classes?",
    "No Post-Term Assignments: Are there any assignments due after the last day of classes?",
    "Missed Assessment Policy: Does the outline have a missed assessment policy section?",
    "Late Submission Policy: Does the outline have a Late Policy section that explains penalties for late submissions?",
    "Participation Grading Criteria: If class participation is listed, are details provided on how it's evaluated?",
    "Assignment Submission Instructions: Are assignment details included with instructions on how and where to submit work?",
    "Group Project Guidelines: If a group project is listed, are details provided including the first group work deadline?",
    "Midterm/Quiz Information: For any midterms or quizzes, is information provided about timing, location, format, and permitted materials?",
    "Final Exam Details: If a Final Exam is listed, does the outline include information on timing, location, modality, and permitted materials?",
    "Final Exam Weight Limit: Does the Final Exam count for LESS THAN 50% of the final grade?",
    "Take-Home Final Identification: If there is a Take-Home Final Examination, is it clearly identified?",
    "Instructor Contact Guidelines: Is the \"Contacting Your Instructor\" section included with guidelines for communication?",
    "Class Schedule Inclusion: Is there a Class Schedule and Topics section showing weekly topics and activities?",
    "Due Dates in Schedule: Does the Class Schedule include or reference assignment due dates?",
    "Exam Dates in Schedule: Does the Class Schedule include quiz, test, or exam dates?",
    "Functional Web Links: Are all links in the outline valid and working?",
];

/// The fixed 26-item course outline checklist
pub fn builtin_checklist() -> &'static [&'static str] {
    BUILTIN_CHECKLIST
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbered_and_bulleted_items() {
        let text = "Checklist\n1. Late policy stated\n2) Grade scale included\n• Instructor email\n- Textbooks listed\n";
        assert_eq!(
            parse_checklist(text),
            vec![
                "Late policy stated",
                "Grade scale included",
                "Instructor email",
                "Textbooks listed",
            ]
        );
    }

    #[test]
    fn test_lettered_items() {
        let text = "a. First requirement\nb) Second requirement";
        assert_eq!(parse_checklist(text), vec!["First requirement", "Second requirement"]);
    }

    #[test]
    fn test_plain_lines_fallback() {
        let text = "Late policy is stated\nshort\n\nGrade scale is included\n";
        assert_eq!(
            parse_checklist(text),
            vec!["Late policy is stated", "Grade scale is included"]
        );
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let text = "1. Late policy\n2. Late policy\n3. Grade scale";
        assert_eq!(parse_checklist(text), vec!["Late policy", "Grade scale"]);
    }

    #[test]
    fn test_negative_number_is_not_a_bullet() {
        assert!(strip_marker("-5 degrees outside").is_none());
    }

    #[test]
    fn test_builtin_checklist() {
        let items = builtin_checklist();
        assert_eq!(items.len(), 26);
        assert!(items[0].starts_with("Instructor Email"));
        assert!(items[25].starts_with("Functional Web Links"));
    }
}
