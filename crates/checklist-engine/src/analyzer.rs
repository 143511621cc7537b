//! Concurrent analysis with an optional oracle
//!
//! The rule path and the oracle path run side by side. Items are evaluated
//! on the blocking pool, `workers` at a time; the oracle receives the
//! checklist in small batches, each under its own timeout, and the whole
//! oracle path stops at the run deadline. Oracle output only adjusts
//! results that already exist, so the rule verdicts are the floor.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use shared_types::{AnalysisRun, ChecklistItem, DetectionMethod, MatchResult, MatchStatus};
use tracing::{debug, info, instrument, warn};

use crate::config::AnalysisConfig;
use crate::oracle::{validate_response, Oracle, OracleError, OracleVerdict};
use crate::{ChecklistEngine, Evaluation, PreparedDocument};

const MAX_BOOSTED_CONFIDENCE: f64 = 0.99;

pub struct Analyzer {
    engine: Arc<ChecklistEngine>,
    oracle: Option<Arc<dyn Oracle>>,
}

impl Analyzer {
    pub fn new(engine: ChecklistEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            oracle: None,
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn engine(&self) -> &ChecklistEngine {
        &self.engine
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    #[instrument(skip_all, fields(items = items.len(), chars = document_text.len()))]
    pub async fn analyze(&self, items: &[String], document_text: &str, context: &str) -> AnalysisRun {
        if items.is_empty() || document_text.trim().is_empty() {
            debug!("nothing to analyze");
            return AnalysisRun::empty();
        }

        let doc = Arc::new(self.engine.prepare(document_text));
        let checklist = self.engine.interpreter().interpret_all(items);
        let texts: Vec<String> = checklist.iter().map(|item| item.text.clone()).collect();

        let (evaluations, verdicts) = tokio::join!(
            self.evaluate_all(&checklist, &doc, context),
            self.consult_oracle(&texts, document_text, context),
        );

        let analysis = &self.engine.config().analysis;
        let results: Vec<MatchResult> = evaluations
            .into_iter()
            .map(|evaluation| match verdicts.get(&evaluation.result.item.text) {
                Some(verdict) => merge(evaluation, verdict, analysis),
                None => evaluation.result,
            })
            .collect();

        let run = AnalysisRun::new(results, doc.char_count(), self.oracle.is_some());
        info!(
            present = run.summary.present,
            missing = run.summary.missing,
            not_applicable = run.summary.not_applicable,
            "analysis complete"
        );
        run
    }

    /// Rule-based evaluation of every item, in checklist order
    async fn evaluate_all(
        &self,
        checklist: &[Arc<ChecklistItem>],
        doc: &Arc<PreparedDocument>,
        context: &str,
    ) -> Vec<Evaluation> {
        let workers = self.engine.config().analysis.workers.max(1);
        let tasks = checklist.iter().cloned().map(|item| {
            let engine = self.engine.clone();
            let doc = doc.clone();
            let context = context.to_string();
            async move {
                let fallback = item.clone();
                match tokio::task::spawn_blocking(move || engine.evaluate(&item, &doc, &context))
                    .await
                {
                    Ok(evaluation) => evaluation,
                    Err(err) => {
                        warn!(item = %fallback.text, error = %err, "item evaluation failed");
                        failed_evaluation(fallback, &err.to_string(), &self.engine)
                    }
                }
            }
        });
        stream::iter(tasks).buffered(workers).collect().await
    }

    /// Oracle verdicts keyed by item text; empty when there is no oracle or
    /// every batch failed
    async fn consult_oracle(
        &self,
        texts: &[String],
        document: &str,
        context: &str,
    ) -> HashMap<String, OracleVerdict> {
        let Some(oracle) = &self.oracle else {
            return HashMap::new();
        };
        let analysis = &self.engine.config().analysis;
        let timeout = analysis.oracle_timeout();
        let batches: Vec<&[String]> = texts.chunks(analysis.oracle_batch_size.max(1)).collect();
        let total = batches.len();

        let calls = batches.into_iter().map(|batch| {
            let oracle = oracle.clone();
            async move {
                let outcome = match tokio::time::timeout(timeout, oracle.assess(batch, document, context)).await {
                    Ok(result) => result,
                    Err(_) => Err(OracleError::Timeout(timeout)),
                };
                match outcome {
                    Ok(value) => {
                        let verdicts = validate_response(&value, batch);
                        debug!(
                            oracle = oracle.name(),
                            batch = batch.len(),
                            accepted = verdicts.len(),
                            "oracle batch validated"
                        );
                        verdicts
                    }
                    Err(err) => {
                        warn!(oracle = oracle.name(), error = %err, "oracle batch failed, keeping rule verdicts");
                        HashMap::new()
                    }
                }
            }
        });

        let deadline = tokio::time::sleep(analysis.run_deadline());
        let completed: Vec<HashMap<String, OracleVerdict>> = stream::iter(calls)
            .buffer_unordered(analysis.oracle_concurrency.max(1))
            .take_until(deadline)
            .collect()
            .await;
        if completed.len() < total {
            warn!(
                completed = completed.len(),
                total,
                "run deadline reached, abandoning outstanding oracle batches"
            );
        }
        completed.into_iter().flatten().collect()
    }
}

/// Fold one oracle verdict into a rule-based result
fn merge(evaluation: Evaluation, oracle: &OracleVerdict, config: &AnalysisConfig) -> MatchResult {
    let Evaluation {
        result,
        authoritative,
    } = evaluation;

    // The oracle has no notion of "not applicable"
    if result.status == MatchStatus::NotApplicable {
        return result;
    }

    if oracle.present == result.present {
        let confidence = (result.confidence + config.agreement_boost).min(MAX_BOOSTED_CONFIDENCE);
        return MatchResult {
            confidence: confidence.max(result.confidence),
            explanation: format!("{} The oracle agrees.", result.explanation),
            ..result
        };
    }

    if authoritative {
        warn!(
            item = %result.item.text,
            rule = %result.status,
            oracle_present = oracle.present,
            oracle_confidence = oracle.confidence,
            "oracle disagrees with an authoritative verdict, keeping the rule verdict"
        );
        return result;
    }

    if oracle.confidence < config.override_confidence {
        debug!(
            item = %result.item.text,
            oracle_confidence = oracle.confidence,
            "oracle disagreement below override confidence"
        );
        return result;
    }

    info!(item = %result.item.text, present = oracle.present, "oracle overrides generic score");
    let explanation = if oracle.explanation.trim().is_empty() {
        "The oracle's verdict overrides the generic score.".to_string()
    } else {
        oracle.explanation.clone()
    };
    MatchResult {
        item: result.item,
        present: oracle.present,
        confidence: oracle.confidence,
        status: if oracle.present {
            MatchStatus::Present
        } else {
            MatchStatus::Missing
        },
        evidence: oracle.evidence.clone(),
        evidence_position: None,
        matched_terms: Default::default(),
        method: DetectionMethod::Oracle,
        explanation,
        criterion_met: None,
    }
}

fn failed_evaluation(item: Arc<ChecklistItem>, error: &str, engine: &ChecklistEngine) -> Evaluation {
    Evaluation {
        result: MatchResult {
            item,
            present: false,
            confidence: engine.config().scoring.absent_floor,
            status: MatchStatus::Missing,
            evidence: String::new(),
            evidence_position: None,
            matched_terms: Default::default(),
            method: DetectionMethod::GenericScore,
            explanation: format!("Evaluation failed: {error}"),
            criterion_met: None,
        },
        authoritative: false,
    }
}
