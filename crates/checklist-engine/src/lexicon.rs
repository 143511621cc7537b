//! Stopword set used when an item has no taxonomy concept

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Naive English stoplist, plus words that occur in nearly every checklist item
const BUILTIN_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "been", "before", "being", "both", "but", "by", "can", "cannot", "could", "did", "do",
    "does", "doing", "each", "either", "for", "from", "had", "has", "have", "having", "here",
    "how", "if", "in", "include", "includes", "including", "into", "is", "it", "its", "itself",
    "just", "listed", "may", "more", "most", "must", "no", "nor", "not", "of", "on", "only", "or",
    "other", "our", "out", "over", "provided", "same", "should", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "under", "until", "very", "was", "were", "what", "when", "where", "whether", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "item", "section",
    "check", "verify", "outline", "course", "details", "information",
];

#[derive(Debug, Clone)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Stopwords {
    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Load a newline-separated list (`#` starts a comment line). A missing
    /// or unreadable file degrades to the built-in list.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match fs::read_to_string(path) {
            Ok(content) => {
                let stopwords = Self::parse(&content);
                if stopwords.words.is_empty() {
                    warn!(path = %path.display(), "stopword file is empty, using built-in list");
                    return Self::builtin();
                }
                debug!(path = %path.display(), count = stopwords.len(), "loaded stopwords");
                stopwords
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "stopword file unavailable, using built-in list");
                Self::builtin()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let words = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_contains_function_words() {
        let stopwords = Stopwords::builtin();
        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("does"));
        assert!(!stopwords.contains("penalty"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let stopwords = Stopwords::parse("# header\nThe\n\n  and \n");
        assert_eq!(stopwords.len(), 2);
        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("and"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let stopwords = Stopwords::load(Some(Path::new("/nonexistent/stopwords.txt")));
        assert_eq!(stopwords.len(), Stopwords::builtin().len());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nbeta").unwrap();
        let stopwords = Stopwords::load(Some(file.path()));
        assert_eq!(stopwords.len(), 2);
        assert!(stopwords.contains("beta"));
    }
}
