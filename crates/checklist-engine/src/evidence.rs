//! Evidence selection and highlighting
//!
//! Evidence is the window of source lines around the first line that holds a
//! matched term, inside the section with the most matched terms, with every
//! matched term wrapped in highlight markers.

use regex::{Regex, RegexBuilder};
use shared_types::TextPosition;
use tracing::debug;

use crate::config::EvidenceConfig;
use crate::document::PreparedDocument;
use crate::patterns::{ceil_boundary, contains_term, find_term, floor_boundary};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evidence {
    pub text: String,
    pub position: Option<TextPosition>,
    /// Set when no location was found
    pub note: Option<String>,
}

impl Evidence {
    pub fn not_found(searched: &[String]) -> Self {
        let note = if searched.is_empty() {
            "no evidence located; no keywords to search".to_string()
        } else {
            format!("no evidence located; searched: {}", searched.join(", "))
        };
        Self {
            text: String::new(),
            position: None,
            note: Some(note),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EvidenceExtractor<'a> {
    config: &'a EvidenceConfig,
}

impl<'a> EvidenceExtractor<'a> {
    pub fn new(config: &'a EvidenceConfig) -> Self {
        Self { config }
    }

    /// Locate evidence for `matched` terms. `preferred` is a section index
    /// to try first (e.g. the one that confirmed the item).
    pub fn extract(
        &self,
        doc: &PreparedDocument,
        matched: &[String],
        searched: &[String],
        preferred: Option<usize>,
    ) -> Evidence {
        let terms: Vec<String> = matched
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            debug!(searched = ?searched, "no matched terms to locate");
            return Evidence::not_found(searched);
        }

        let lower = doc.lower();
        let hits_in = |start: usize, end: usize| {
            let body = &lower[start..end];
            terms.iter().filter(|t| contains_term(body, t)).count()
        };

        let sections = doc.sections();
        let preferred = preferred
            .and_then(|idx| sections.get(idx))
            .filter(|s| hits_in(s.start_offset, s.end_offset) > 0);
        // Ties go to the earliest section
        let best = preferred.or_else(|| {
            sections
                .iter()
                .map(|s| (hits_in(s.start_offset, s.end_offset), s))
                .filter(|(hits, _)| *hits > 0)
                .fold(None, |best: Option<(usize, _)>, (hits, s)| match best {
                    Some((top, _)) if top >= hits => best,
                    _ => Some((hits, s)),
                })
                .map(|(_, s)| s)
        });

        let Some(section) = best else {
            debug!(searched = ?searched, "matched terms not found in any section");
            return Evidence::not_found(searched);
        };

        let section_lower = &lower[section.start_offset..section.end_offset];
        let first_hit = terms
            .iter()
            .filter_map(|t| find_term(section_lower, t))
            .min()
            .map(|offset| section.start_offset + offset);
        let Some(hit) = first_hit else {
            return Evidence::not_found(searched);
        };

        let position = self.line_window(
            doc.text(),
            hit,
            hit,
            (section.start_offset, section.end_offset),
            self.config.context_lines,
        );
        Evidence {
            text: self.highlight(
                &doc.text()[position.start_offset..position.end_offset],
                &terms,
            ),
            position: Some(position),
            note: None,
        }
    }

    /// Whole lines covering `start..end`, widened by `context` lines on each
    /// side, kept inside `bounds` and capped at the configured length
    pub fn line_window(
        &self,
        text: &str,
        start: usize,
        end: usize,
        bounds: (usize, usize),
        context: usize,
    ) -> TextPosition {
        let (lo, hi) = bounds;
        let start = start.clamp(lo, hi);
        let end = end.clamp(start, hi);

        let mut first = text[lo..start].rfind('\n').map_or(lo, |i| lo + i + 1);
        for _ in 0..context {
            if first <= lo {
                break;
            }
            first = text[lo..first - 1].rfind('\n').map_or(lo, |i| lo + i + 1);
        }

        let mut last = text[end..hi].find('\n').map_or(hi, |i| end + i);
        for _ in 0..context {
            if last >= hi {
                break;
            }
            last = text[last + 1..hi].find('\n').map_or(hi, |i| last + 1 + i);
        }

        // Trim the surrounding whitespace, then cap the length around the hit
        let slice = &text[first..last];
        let first = first + (slice.len() - slice.trim_start().len());
        let last = (last - (slice.len() - slice.trim_end().len())).max(first);
        let (first, last) = self.cap(text, first, last, start);
        TextPosition {
            start_offset: first,
            end_offset: last,
        }
    }

    fn cap(&self, text: &str, first: usize, last: usize, anchor: usize) -> (usize, usize) {
        let max = self.config.max_chars;
        if max == 0 || last - first <= max {
            return (first, last);
        }
        // Keep the anchor inside the capped window
        let begin = if anchor.saturating_sub(first) > max / 2 {
            floor_boundary(text, anchor - max / 2)
        } else {
            first
        };
        let end = floor_boundary(text, (begin + max).min(last));
        (ceil_boundary(text, begin).min(end), end)
    }

    /// Wrap every occurrence of `terms` in the highlight markers, longest
    /// term first so that phrases win over their own words
    pub fn highlight(&self, text: &str, terms: &[String]) -> String {
        let Some(pattern) = highlight_pattern(terms) else {
            return text.to_string();
        };
        let open = &self.config.highlight_open;
        let close = &self.config.highlight_close;
        pattern
            .replace_all(text, |caps: &regex::Captures| {
                format!("{open}{}{close}", &caps[0])
            })
            .into_owned()
    }
}

fn highlight_pattern(terms: &[String]) -> Option<Regex> {
    let mut terms: Vec<&str> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return None;
    }
    terms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    terms.dedup();
    let alternation = terms
        .iter()
        .map(|t| {
            let escaped = regex::escape(t);
            if t.chars().next().is_some_and(char::is_alphanumeric) {
                format!(r"\b{escaped}")
            } else {
                escaped
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    match RegexBuilder::new(&alternation).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(err) => {
            debug!(error = %err, "highlight pattern rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::Segmenter;
    use pretty_assertions::assert_eq;

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn doc(text: &str) -> PreparedDocument {
        PreparedDocument::new(text, &Segmenter::default())
    }

    #[test]
    fn test_highlight_prefers_longer_terms() {
        let config = EvidenceConfig::default();
        let extractor = EvidenceExtractor::new(&config);
        let out = extractor.highlight(
            "Late Policy: late work loses marks.",
            &terms(&["late", "late policy"]),
        );
        assert_eq!(
            out,
            "<mark>Late Policy</mark>: <mark>late</mark> work loses marks."
        );
    }

    #[test]
    fn test_highlight_respects_word_start() {
        let config = EvidenceConfig::default();
        let extractor = EvidenceExtractor::new(&config);
        let out = extractor.highlight("translate late", &terms(&["late"]));
        assert_eq!(out, "translate <mark>late</mark>");
    }

    #[test]
    fn test_extract_picks_section_with_most_terms() {
        let text = "\
Introduction
penalty mentioned once.
Late Policy
line one
late work gets a penalty of 5%.
line three
line four
line five
Schedule
week 1.";
        let config = EvidenceConfig::default();
        let evidence = EvidenceExtractor::new(&config).extract(
            &doc(text),
            &terms(&["late", "penalty"]),
            &terms(&["late", "penalty"]),
            None,
        );
        // The header line holds the first hit; two lines of context follow it
        assert_eq!(
            evidence.text,
            "<mark>Late</mark> Policy\nline one\n<mark>late</mark> work gets a <mark>penalty</mark> of 5%."
        );
        let position = evidence.position.unwrap();
        assert!(text[position.start_offset..position.end_offset].starts_with("Late Policy"));
        assert_eq!(evidence.note, None);
    }

    #[test]
    fn test_extract_without_location_leaves_note() {
        let config = EvidenceConfig::default();
        let evidence = EvidenceExtractor::new(&config).extract(
            &doc("nothing here"),
            &[],
            &terms(&["late", "penalty"]),
            None,
        );
        assert_eq!(evidence.text, "");
        assert_eq!(
            evidence.note.as_deref(),
            Some("no evidence located; searched: late, penalty")
        );
    }

    #[test]
    fn test_extract_caps_length() {
        let config = EvidenceConfig {
            max_chars: 20,
            context_lines: 0,
            ..EvidenceConfig::default()
        };
        let text = format!("{} late {}", "x".repeat(50), "y".repeat(50));
        let evidence =
            EvidenceExtractor::new(&config).extract(&doc(&text), &terms(&["late"]), &[], None);
        let position = evidence.position.unwrap();
        assert!(position.end_offset - position.start_offset <= 20);
        assert!(evidence.text.contains("<mark>late</mark>"));
    }

    #[test]
    fn test_line_window_stays_within_bounds() {
        let config = EvidenceConfig::default();
        let extractor = EvidenceExtractor::new(&config);
        let text = "a\nb\nc\nd\ne";
        let position = extractor.line_window(text, 4, 5, (2, 7), 5);
        assert_eq!(&text[position.start_offset..position.end_offset], "b\nc\nd");
    }
}
