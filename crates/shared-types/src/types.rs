use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A checklist term together with its matching weight
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

/// Threshold family an item falls into, derived from the item wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Mentions a policy, rule or procedure
    Policy,
    /// Mentions contact details or an email address
    Contact,
    Standard,
}

/// One requirement of a checklist, interpreted once at load time
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    /// Concept tags; at most one primary concept from the trigger rules
    pub concepts: BTreeSet<String>,
    /// Ordered (term, weight) pairs used for coverage scoring
    pub keywords: Vec<WeightedTerm>,
    pub category: ItemCategory,
}

impl ChecklistItem {
    /// Primary concept, if a trigger rule matched the item text
    pub fn concept(&self) -> Option<&str> {
        self.concepts.iter().next().map(String::as_str)
    }

    pub fn has_concept(&self, concept: &str) -> bool {
        self.concepts.contains(concept)
    }
}

/// A contiguous span of the source document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Section {
    /// Header text as written; empty for an unheaded span
    pub title: String,
    /// Lowercased body text (after the header) used for matching
    pub content: String,
    pub start_offset: usize, // Byte offset of the header line
    pub end_offset: usize,   // Byte offset where the next section begins
    /// Byte offset where the body begins
    pub body_offset: usize,
}

impl Section {
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    pub fn is_headed(&self) -> bool {
        !self.title.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextPosition {
    pub start_offset: usize, // Byte offset in the document text
    pub end_offset: usize,   // End byte offset
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Present,
    Missing,
    /// The requirement does not apply to this document
    NotApplicable,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchStatus::Present => "Present",
            MatchStatus::Missing => "Missing",
            MatchStatus::NotApplicable => "N/A",
        };
        f.write_str(label)
    }
}

/// Detector stage that produced the final verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    GenericScore,
    SpecialCase,
    Oracle,
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DetectionMethod::GenericScore => "generic-score",
            DetectionMethod::SpecialCase => "special-case",
            DetectionMethod::Oracle => "oracle",
        };
        f.write_str(label)
    }
}

/// Verdict for one (document, checklist item) pair
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchResult {
    pub item: Arc<ChecklistItem>,
    pub present: bool,
    pub confidence: f64, // 0.0 ..= 1.0
    pub status: MatchStatus,
    pub evidence: String,
    pub evidence_position: Option<TextPosition>, // Evidence window in the source text
    pub matched_terms: BTreeSet<String>,
    pub method: DetectionMethod,
    pub explanation: String,
    /// Set when the topic is present but carries a measurable criterion
    /// (e.g. final exam weight), telling whether the criterion holds
    pub criterion_met: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisSummary {
    pub total: usize,
    pub present: usize,
    pub missing: usize,
    pub not_applicable: usize,
}

impl AnalysisSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                MatchStatus::Present => summary.present += 1,
                MatchStatus::Missing => summary.missing += 1,
                MatchStatus::NotApplicable => summary.not_applicable += 1,
            }
        }
        summary
    }
}

/// All verdicts for one document against one checklist
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisRun {
    pub results: Vec<MatchResult>,
    pub summary: AnalysisSummary,
    pub document_chars: usize,
    pub oracle_consulted: bool,
    pub analyzed_at: u64,
}

impl AnalysisRun {
    pub fn new(results: Vec<MatchResult>, document_chars: usize, oracle_consulted: bool) -> Self {
        let summary = AnalysisSummary::from_results(&results);
        Self {
            results,
            summary,
            document_chars,
            oracle_consulted,
            analyzed_at: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, false)
    }
}
