pub mod types;

pub use types::{
    AnalysisRun, AnalysisSummary, ChecklistItem, DetectionMethod, ItemCategory, MatchResult,
    MatchStatus, Section, TextPosition, WeightedTerm,
};
