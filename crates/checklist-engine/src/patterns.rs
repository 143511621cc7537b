//! Keyword tables and text helpers shared by the scorer and the rules

/// Role words that tie an email address to the teaching staff
pub const ROLE_TERMS: &[&str] = &[
    "instructor",
    "professor",
    "faculty",
    "lecturer",
    "teacher",
    "dr.",
    "contact",
];

/// Words signalling lateness
pub const LATE_TERMS: &[&str] = &[
    "late",
    "overdue",
    "past the deadline",
    "after the deadline",
    "after the due date",
    "tardy",
    "grace period",
];

/// Words signalling a grade consequence
pub const PENALTY_TERMS: &[&str] = &[
    "penal",
    "deduct",
    "reduc",
    "zero",
    "not be accepted",
    "not accepted",
    "will not be graded",
    "lose",
    "loss of",
    "marked down",
    "points off",
    "per day",
    "%",
];

pub const ABSENCE_TERMS: &[&str] = &[
    "missed",
    "miss ",
    "absence",
    "absent",
    "unable to attend",
    "unable to write",
    "illness",
    "medical",
    "deferral",
    "deferred",
    "make-up",
    "makeup",
    "extenuating",
    "compassionate",
    "emergency",
    "excused",
    "reweight",
];

pub const ASSESSMENT_TERMS: &[&str] = &[
    "exam",
    "midterm",
    "quiz",
    "test",
    "assignment",
    "assessment",
    "presentation",
    "deadline",
];

/// Language that turns an incidental mention into a stated procedure
pub const PROCEDURAL_TERMS: &[&str] = &[
    "must",
    "should",
    "will be",
    "required",
    "documentation",
    "notify",
    "contact the instructor",
    "within",
    "policy",
    "procedure",
];

/// Section titles that hold course policies
pub const POLICY_TITLE_TERMS: &[&str] = &[
    "polic",
    "procedure",
    "rule",
    "regulation",
    "guideline",
    "expectation",
    "absence",
    "missed",
    "deferral",
    "late",
];

/// Section titles that hold assessment descriptions
pub const ASSIGNMENT_TITLE_TERMS: &[&str] = &[
    "assignment",
    "assessment",
    "evaluation",
    "deliverable",
    "submission",
    "coursework",
    "grading",
];

/// Phrases declaring that a requirement does not apply
pub const NOT_APPLICABLE_PHRASES: &[&str] = &[
    "not applicable",
    "n/a",
    "doesn't apply",
    "does not apply",
    "not included",
    "not required",
    "no final",
    "no exam",
    "no midterm",
    "no group",
    "no team",
    "no participation",
    "no textbook",
    "not needed",
    "exempt from",
    "waived",
    "excluded",
    "not part of",
    "individual only",
    "all individual work",
];

/// Bigrams too generic to count as phrase evidence
pub const FUNCTION_BIGRAMS: &[&str] = &[
    "does the",
    "is there",
    "are there",
    "are the",
    "is the",
    "if a",
    "if the",
    "of the",
    "in the",
    "for the",
    "to the",
    "the course",
    "course outline",
    "the outline",
    "outline include",
    "outline have",
];

/// True if `term` occurs in `haystack` starting at a word boundary.
/// Both arguments are expected lowercased.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    find_term(haystack, term).is_some()
}

/// Byte offset of the first occurrence of `term` starting at a word boundary
pub fn find_term(haystack: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }
    haystack
        .match_indices(term)
        .map(|(idx, _)| idx)
        .find(|&idx| starts_at_boundary(haystack, idx, term))
}

fn starts_at_boundary(haystack: &str, idx: usize, term: &str) -> bool {
    let term_starts_with_word = term.chars().next().is_some_and(char::is_alphanumeric);
    if !term_starts_with_word {
        return true;
    }
    haystack[..idx]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric())
}

/// True if any of `terms` occurs in `haystack`
pub fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| contains_term(haystack, term))
}

/// Distinct `terms` present in `haystack`
pub fn count_distinct(haystack: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| contains_term(haystack, term)).count()
}

/// Byte offset of the first occurrence of `term` as a whole word, so
/// "late" skips "latest" and "translate"
pub fn find_word(haystack: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }
    haystack
        .match_indices(term)
        .map(|(idx, _)| idx)
        .find(|&idx| {
            starts_at_boundary(haystack, idx, term) && ends_at_boundary(haystack, idx + term.len(), term)
        })
}

fn ends_at_boundary(haystack: &str, end: usize, term: &str) -> bool {
    let term_ends_with_word = term.chars().next_back().is_some_and(char::is_alphanumeric);
    if !term_ends_with_word {
        return true;
    }
    haystack[end..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric())
}

pub fn contains_word(haystack: &str, term: &str) -> bool {
    find_word(haystack, term).is_some()
}

/// True if any of `terms` occurs in `haystack` as a whole word
pub fn contains_any_word(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| contains_word(haystack, term))
}

/// Distinct `terms` present in `haystack` as whole words
pub fn count_distinct_words(haystack: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| contains_word(haystack, term)).count()
}

/// Lowercase and collapse every whitespace run to a single space
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercased words with surrounding punctuation removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == '/')
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '%')
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Split on sentence punctuation and line breaks, returning trimmed spans
/// with their byte offsets
pub fn sentences(text: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        let boundary = match c {
            '\n' | ';' | '!' | '?' => true,
            // A period ends a sentence only when followed by whitespace or end
            '.' => text[idx + 1..]
                .chars()
                .next()
                .is_none_or(char::is_whitespace),
            _ => false,
        };
        if boundary {
            push_trimmed(&mut spans, text, start, idx + c.len_utf8());
            start = idx + c.len_utf8();
        }
    }
    push_trimmed(&mut spans, text, start, text.len());
    spans
}

fn push_trimmed<'a>(spans: &mut Vec<(usize, &'a str)>, text: &'a str, start: usize, end: usize) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        let lead = raw.len() - raw.trim_start().len();
        spans.push((start + lead, trimmed));
    }
}

/// Largest char boundary at or below `idx`
pub fn floor_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest char boundary at or above `idx`
pub fn ceil_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// `text[center - radius .. center + radius]`, clamped to char boundaries
pub fn window(text: &str, center: usize, radius: usize) -> (usize, &str) {
    let start = floor_boundary(text, center.saturating_sub(radius));
    let end = ceil_boundary(text, center.saturating_add(radius));
    (start, &text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_contains_term_respects_left_boundary() {
        assert!(contains_term("late submissions lose 5%", "late"));
        assert!(contains_term("two assignments", "assignment"));
        assert!(!contains_term("we translate texts", "late"));
        assert!(contains_term("email: a@ucalgary.ca", "@ucalgary"));
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn test_find_term_skips_embedded_match() {
        assert_eq!(find_term("translate, then late", "late"), Some(16));
    }

    #[test]
    fn test_find_word_needs_both_boundaries() {
        assert_eq!(find_word("use the latest template, or be late.", "late"), Some(31));
        assert!(!contains_word("see you later", "late"));
        assert!(!contains_word("a lateral move", "late"));
        assert!(contains_word("submitted late", "late"));
        assert!(contains_word("work past the deadline loses marks", "past the deadline"));
        assert_eq!(count_distinct_words("latest, later, tardy", LATE_TERMS), 1);
        assert!(!contains_any_word("the latest template", LATE_TERMS));
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Late\n\tPolicy   Here "), "late policy here");
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Midterm/Quiz: (40%) doesn't"),
            vec!["midterm", "quiz", "40%", "doesn't"]
        );
    }

    #[test]
    fn test_sentences_split_with_offsets() {
        let text = "First one. Second; third\nfourth at 2.5 pts";
        let got = sentences(text);
        assert_eq!(
            got,
            vec![
                (0, "First one."),
                (11, "Second;"),
                (19, "third"),
                (25, "fourth at 2.5 pts"),
            ]
        );
    }

    #[test]
    fn test_window_clamps_to_char_boundaries() {
        let text = "héllo wörld";
        let (start, slice) = window(text, 2, 1);
        assert!(text.is_char_boundary(start));
        assert!(slice.starts_with('h'));
    }
}
