//! A document prepared once per run and shared read-only by every item

use shared_types::Section;

use crate::patterns::normalize;
use crate::segmenter::Segmenter;

#[derive(Debug, Clone)]
pub struct PreparedDocument {
    text: String,
    /// ASCII-lowercased copy; byte offsets line up with `text`
    lower: String,
    /// Lowercased with whitespace runs collapsed
    normalized: String,
    sections: Vec<Section>,
}

impl PreparedDocument {
    pub fn new(text: &str, segmenter: &Segmenter) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_ascii_lowercase(),
            normalized: normalize(text),
            sections: segmenter.segment(text),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn headed_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.is_headed())
    }

    /// Lowercased body of a section as a slice of `lower`
    pub fn section_lower(&self, section: &Section) -> &str {
        &self.lower[section.body_offset..section.end_offset]
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
