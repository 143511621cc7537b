//! Document segmentation
//!
//! Splits document text into contiguous, non-overlapping sections. A section
//! runs from the start of its header line to the start of the next header,
//! so the section offsets always tile the whole document.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::Section;

use crate::config::SegmenterConfig;

lazy_static! {
    /// Short capitalized line without sentence punctuation or a percentage
    static ref PLAIN_HEADER: Regex =
        Regex::new(r"(?m)^[ \t]*([A-Z][^\r\n.!?:%]{2,79}?)[ \t\r]*$").unwrap();

    /// Capitalized phrase followed by a colon; the body starts after the colon
    static ref COLON_HEADER: Regex =
        Regex::new(r"(?m)^[ \t]*([A-Z][A-Za-z0-9 &/'()\-]{2,60}?)[ \t]*:").unwrap();

    /// "3. Grading" / "2.1 Late Work"
    static ref NUMBERED_HEADER: Regex =
        Regex::new(r"(?m)^[ \t]*(\d{1,2}(?:\.\d{1,2})*\.?[ \t]+[A-Z][^\r\n.!?:%]{2,60}?)[ \t\r]*$").unwrap();

    /// Markdown heading or a line wrapped in bold markers
    static ref EMPHASIS_HEADER: Regex =
        Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]+([^\r\n#]+?)|\*\*([^\r\n*]+?)\*\*:?)[ \t\r]*$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderCandidate {
    line_start: usize,
    body_start: usize,
    title: String,
}

#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Ordered sections covering `text` from byte 0 to `text.len()`
    pub fn segment(&self, text: &str) -> Vec<Section> {
        let headers = self.find_headers(text);
        if headers.is_empty() {
            return vec![make_section(text, String::new(), 0, 0, text.len())];
        }

        let mut sections = Vec::with_capacity(headers.len() + 1);
        let first_start = headers[0].line_start;
        let lead_is_blank = text[..first_start].trim().is_empty();
        if !lead_is_blank {
            sections.push(make_section(text, String::new(), 0, 0, first_start));
        }

        for (idx, header) in headers.iter().enumerate() {
            let end = headers
                .get(idx + 1)
                .map_or(text.len(), |next| next.line_start);
            // Leading whitespace before the first header belongs to it
            let start = if idx == 0 && lead_is_blank {
                0
            } else {
                header.line_start
            };
            sections.push(make_section(
                text,
                header.title.clone(),
                start,
                header.body_start,
                end,
            ));
        }
        sections
    }

    fn find_headers(&self, text: &str) -> Vec<HeaderCandidate> {
        let mut candidates = Vec::new();
        for pattern in [
            &*EMPHASIS_HEADER,
            &*NUMBERED_HEADER,
            &*COLON_HEADER,
            &*PLAIN_HEADER,
        ] {
            for caps in pattern.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let Some(title) = caps.iter().skip(1).flatten().next() else {
                    continue;
                };
                let title = title.as_str().trim();
                if self.is_plausible_title(title) {
                    candidates.push(HeaderCandidate {
                        line_start: whole.start(),
                        body_start: whole.end(),
                        title: title.to_string(),
                    });
                }
            }
        }

        // Stable sort keeps the first pattern's reading of a shared line
        candidates.sort_by_key(|c| c.line_start);
        candidates.dedup_by_key(|c| c.line_start);
        candidates
    }

    fn is_plausible_title(&self, title: &str) -> bool {
        title.chars().count() >= self.config.min_header_chars
            && title.split_whitespace().count() <= self.config.max_header_words
            && title.chars().any(char::is_alphabetic)
    }
}

fn make_section(text: &str, title: String, start: usize, body: usize, end: usize) -> Section {
    let body = body.clamp(start, end);
    Section {
        title,
        content: text[body..end].to_ascii_lowercase(),
        start_offset: start,
        end_offset: end,
        body_offset: body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn segment(text: &str) -> Vec<Section> {
        Segmenter::default().segment(text)
    }

    fn titles(sections: &[Section]) -> Vec<&str> {
        sections.iter().map(|s| s.title.as_str()).collect()
    }

    fn assert_tiles(text: &str, sections: &[Section]) {
        assert!(!sections.is_empty());
        assert_eq!(sections[0].start_offset, 0);
        assert_eq!(sections.last().unwrap().end_offset, text.len());
        for pair in sections.windows(2) {
            assert_eq!(pair[0].end_offset, pair[1].start_offset);
        }
        let covered: usize = sections.iter().map(Section::len).sum();
        assert_eq!(covered, text.len());
    }

    #[test]
    fn test_no_headers_yields_whole_document() {
        let text = "just some lowercase prose without any header lines at all.";
        let sections = segment(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "");
        assert_eq!(sections[0].content, text);
        assert_tiles(text, &sections);
    }

    #[test]
    fn test_empty_document() {
        let sections = segment("");
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_empty());
    }

    #[test]
    fn test_detects_each_header_style() {
        let text = "\
Course Outline
intro text here.
Late Policy
late work loses 5% per day.
Instructor: Dr. X, jane@ucalgary.ca
3. Grade Distribution
assignments 40%.
## Class Schedule
week one.
**Missed Assessments**
see below.
";
        let sections = segment(text);
        assert_eq!(
            titles(&sections),
            vec![
                "Course Outline",
                "Late Policy",
                "Instructor",
                "3. Grade Distribution",
                "Class Schedule",
                "Missed Assessments",
            ]
        );
        assert_tiles(text, &sections);
    }

    #[test]
    fn test_colon_header_body_starts_after_colon() {
        let text = "Group Project: 45% of the final grade";
        let sections = segment(text);
        assert_eq!(sections[0].title, "Group Project");
        assert_eq!(sections[0].content, " 45% of the final grade");
    }

    #[test]
    fn test_long_lines_are_not_headers() {
        let text = "Late Submissions Will Be Penalized Five Percent Per Day\nbody";
        let sections = segment(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "");
    }

    #[test]
    fn test_table_rows_are_not_headers() {
        let text = "Grade Distribution\nQuizzes 20%\nFinal Exam 40%\n";
        assert_eq!(titles(&segment(text)), vec!["Grade Distribution"]);
    }

    #[test]
    fn test_short_titles_are_rejected() {
        let text = "Abc\nbody text\n";
        assert_eq!(titles(&segment(text)), vec![""]);
    }

    #[test]
    fn test_unheaded_lead_forms_its_own_section() {
        let text = "some preamble\nLate Policy\nno late work.";
        let sections = segment(text);
        assert_eq!(titles(&sections), vec!["", "Late Policy"]);
        assert_eq!(sections[0].end_offset, 14);
        assert_tiles(text, &sections);
    }

    #[test]
    fn test_blank_lead_is_absorbed_by_first_header() {
        let text = "\n\n  \nLate Policy\nno late work.";
        let sections = segment(text);
        assert_eq!(titles(&sections), vec!["Late Policy"]);
        assert_eq!(sections[0].start_offset, 0);
        assert_tiles(text, &sections);
    }

    #[test]
    fn test_content_is_lowercased() {
        let sections = segment("Late Policy\nno LATE Work");
        assert_eq!(sections[0].content, "\nno late work");
    }

    #[test]
    fn test_custom_word_limit() {
        let segmenter = Segmenter::new(SegmenterConfig {
            min_header_chars: 4,
            max_header_words: 1,
        });
        let sections = segmenter.segment("Late Policy\nbody\nGrading\nbody");
        assert_eq!(titles(&sections), vec!["", "Grading"]);
    }

    proptest! {
        #[test]
        fn prop_sections_tile_document(text in "\\PC{0,200}") {
            let sections = segment(&text);
            prop_assert!(!sections.is_empty());
            prop_assert_eq!(sections[0].start_offset, 0);
            prop_assert_eq!(sections.last().unwrap().end_offset, text.len());
            for pair in sections.windows(2) {
                prop_assert_eq!(pair[0].end_offset, pair[1].start_offset);
            }
            let covered: usize = sections.iter().map(Section::len).sum();
            prop_assert_eq!(covered, text.len());
        }

        #[test]
        fn prop_sections_tile_outline_like_text(
            lines in proptest::collection::vec(
                prop_oneof![
                    "[A-Z][a-z]{3,9}( [A-Z][a-z]{2,8}){0,3}",
                    "[A-Z][a-z]{3,9}: [a-z ]{0,30}",
                    "[0-9]\\. [A-Z][a-z]{3,12}",
                    "## [A-Z][a-z]{3,12}",
                    "[a-z ,.%0-9]{0,60}",
                ],
                0..20,
            )
        ) {
            let text = lines.join("\n");
            let sections = segment(&text);
            prop_assert_eq!(sections[0].start_offset, 0);
            prop_assert_eq!(sections.last().unwrap().end_offset, text.len());
            for pair in sections.windows(2) {
                prop_assert_eq!(pair[0].end_offset, pair[1].start_offset);
                prop_assert!(pair[0].body_offset <= pair[0].end_offset);
            }
        }
    }
}
