//! Engine configuration
//!
//! Every tunable of the matcher lives here so that the empirically chosen
//! thresholds can be adjusted from a TOML file instead of the source. All
//! sections are optional; a missing field falls back to the default below.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shared_types::ItemCategory;

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Newline-separated stopword list; the built-in list is used when absent
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use checklist_engine::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("outline-audit.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// ```
    /// use checklist_engine::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_str("[scoring]\npermissive_bias = 0.05\n")?;
    /// assert_eq!(config.scoring.permissive_bias, 0.05);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let scoring = &self.scoring;
        for (name, value) in [
            ("base_threshold", scoring.base_threshold),
            ("policy_threshold", scoring.policy_threshold),
            ("contact_threshold", scoring.contact_threshold),
            ("section_fraction", scoring.section_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("scoring.{name} must be within 0.0..=1.0 (got {value})");
            }
        }
        if scoring.absent_floor > scoring.absent_ceiling {
            anyhow::bail!(
                "scoring.absent_floor ({}) exceeds scoring.absent_ceiling ({})",
                scoring.absent_floor,
                scoring.absent_ceiling
            );
        }
        if self.analysis.workers == 0 || self.analysis.oracle_batch_size == 0 {
            anyhow::bail!("analysis.workers and analysis.oracle_batch_size must be positive");
        }
        Ok(())
    }
}

/// Thresholds and weights of the generic scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_threshold: f64,
    /// Items mentioning a policy, rule or procedure
    pub policy_threshold: f64,
    /// Items mentioning contact details or email
    pub contact_threshold: f64,
    /// Subtracted from every threshold; raise it to favor "present"
    pub permissive_bias: f64,
    /// Added to the numerator for each item phrase found verbatim
    pub phrase_bonus: f64,
    pub exact_match_confidence: f64,
    /// Share of keyword terms a section must contain to confirm an item
    pub section_fraction: f64,
    /// Confidence floor when only section placement confirmed the item
    pub section_confidence: f64,
    pub present_cap: f64,
    pub absent_floor: f64,
    pub absent_ceiling: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_threshold: 0.40,
            policy_threshold: 0.30,
            contact_threshold: 0.35,
            permissive_bias: 0.0,
            phrase_bonus: 0.5,
            exact_match_confidence: 0.98,
            section_fraction: 0.60,
            section_confidence: 0.60,
            present_cap: 0.95,
            absent_floor: 0.2,
            absent_ceiling: 0.5,
        }
    }
}

impl ScoringConfig {
    /// Presence threshold for a category, after the permissive bias
    pub fn threshold_for(&self, category: ItemCategory) -> f64 {
        let base = match category {
            ItemCategory::Policy => self.policy_threshold,
            ItemCategory::Contact => self.contact_threshold,
            ItemCategory::Standard => self.base_threshold,
        };
        (base - self.permissive_bias).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub min_header_chars: usize,
    pub max_header_words: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_header_chars: 4,
            max_header_words: 6,
        }
    }
}

/// Parameters of the deterministic detectors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Institutional domain an instructor email must end with
    pub required_email_domain: String,
    /// Characters searched on each side of an email for a role term
    pub role_proximity: usize,
    /// Maximum group-work share of the final grade, in percent
    pub group_work_ceiling: f64,
    /// Maximum final exam share of the final grade, in percent
    pub final_exam_limit: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            required_email_domain: "ucalgary.ca".to_string(),
            role_proximity: 200,
            group_work_ceiling: 40.0,
            final_exam_limit: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Lines kept on each side of the first matching line
    pub context_lines: usize,
    pub max_chars: usize,
    pub highlight_open: String,
    pub highlight_close: String,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            context_lines: 2,
            max_chars: 600,
            highlight_open: "<mark>".to_string(),
            highlight_close: "</mark>".to_string(),
        }
    }
}

/// Scheduling of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Items evaluated concurrently on the blocking pool
    pub workers: usize,
    pub oracle_batch_size: usize,
    /// Oracle batches in flight at once
    pub oracle_concurrency: usize,
    pub oracle_timeout_secs: u64,
    pub run_deadline_secs: u64,
    /// Confidence added when the oracle agrees with the rule verdict
    pub agreement_boost: f64,
    /// Oracle confidence needed to override a generic-score verdict
    pub override_confidence: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            oracle_batch_size: 2,
            oracle_concurrency: 2,
            oracle_timeout_secs: 60,
            run_deadline_secs: 120,
            agreement_boost: 0.05,
            override_confidence: 0.80,
        }
    }
}

impl AnalysisConfig {
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }
}

/// Connection settings of the HTTP oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f64,
    /// Document text beyond this many characters is not sent
    pub max_document_chars: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.1,
            max_document_chars: 12_000,
        }
    }
}
