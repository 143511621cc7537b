//! Optional external oracle
//!
//! The oracle is an advisory second opinion. Whatever it returns is checked
//! here before the analyzer sees it: entries with the wrong shape, unknown
//! item text or an out-of-range confidence are dropped one by one, so a
//! partly broken response still contributes its good entries.

pub mod http;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub use http::HttpOracle;

/// Oracle call failures; the analyzer logs them and keeps the rule verdicts
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed oracle response: {0}")]
    Malformed(String),

    #[error("API key variable {0} is not set")]
    MissingApiKey(String),
}

/// A semantic assessor for a batch of checklist items
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Raw JSON verdicts for `items`; shape checking is left to
    /// [`validate_response`]
    async fn assess(
        &self,
        items: &[String],
        document: &str,
        context: &str,
    ) -> Result<Value, OracleError>;

    fn name(&self) -> &str;
}

/// One well-formed oracle verdict
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OracleVerdict {
    pub present: bool,
    pub confidence: f64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub evidence: String,
}

#[derive(Deserialize)]
struct TaggedVerdict {
    item: String,
    #[serde(flatten)]
    verdict: OracleVerdict,
}

/// Map item text to its verdict. Accepted shapes:
/// - an object keyed by item text
/// - an array of objects carrying an `item` field
/// - an array in batch order, when it has exactly one entry per item
/// - either array wrapped in an object (e.g. `{"results": [...]}`)
pub fn validate_response(value: &Value, items: &[String]) -> HashMap<String, OracleVerdict> {
    let mut verdicts = HashMap::new();
    match value {
        Value::Array(entries) => collect_array(entries, items, &mut verdicts),
        Value::Object(map) => {
            if let Some(entries) = map.values().find_map(Value::as_array) {
                collect_array(entries, items, &mut verdicts);
            } else {
                for (key, entry) in map {
                    let Some(item) = lookup(items, key) else {
                        debug!(key = %key, "oracle verdict for an unknown item");
                        continue;
                    };
                    if let Some(verdict) = parse_verdict(entry) {
                        verdicts.insert(item.clone(), verdict);
                    }
                }
            }
        }
        other => debug!(kind = ?other, "oracle response is neither an object nor an array"),
    }
    verdicts
}

fn collect_array(entries: &[Value], items: &[String], out: &mut HashMap<String, OracleVerdict>) {
    let tagged = entries
        .iter()
        .any(|entry| entry.get("item").is_some_and(Value::is_string));
    if tagged {
        for entry in entries {
            let Ok(TaggedVerdict { item, verdict }) = TaggedVerdict::deserialize(entry) else {
                debug!(entry = %entry, "dropping malformed oracle entry");
                continue;
            };
            match (lookup(items, &item), check_confidence(verdict)) {
                (Some(known), Some(verdict)) => {
                    out.insert(known.clone(), verdict);
                }
                _ => debug!(item = %item, "dropping oracle entry"),
            }
        }
    } else if entries.len() == items.len() {
        for (item, entry) in items.iter().zip(entries) {
            if let Some(verdict) = parse_verdict(entry) {
                out.insert(item.clone(), verdict);
            }
        }
    } else {
        debug!(
            entries = entries.len(),
            items = items.len(),
            "untagged oracle array does not line up with the batch"
        );
    }
}

fn parse_verdict(entry: &Value) -> Option<OracleVerdict> {
    match OracleVerdict::deserialize(entry) {
        Ok(verdict) => check_confidence(verdict),
        Err(err) => {
            debug!(error = %err, "dropping malformed oracle entry");
            None
        }
    }
}

fn check_confidence(verdict: OracleVerdict) -> Option<OracleVerdict> {
    (verdict.confidence.is_finite() && (0.0..=1.0).contains(&verdict.confidence))
        .then_some(verdict)
}

fn lookup<'a>(items: &'a [String], key: &str) -> Option<&'a String> {
    let key = key.trim();
    items.iter().find(|item| item.trim() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn items() -> Vec<String> {
        vec!["Late policy".to_string(), "Grade scale".to_string()]
    }

    #[test]
    fn test_keyed_object() {
        let value = json!({
            "Late policy": {"present": true, "confidence": 0.9, "explanation": "found"},
            "Grade scale": {"present": false, "confidence": 0.7}
        });
        let verdicts = validate_response(&value, &items());
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts["Late policy"].explanation, "found");
        assert!(!verdicts["Grade scale"].present);
    }

    #[test]
    fn test_wrapped_tagged_array() {
        let value = json!({"results": [
            {"item": "Grade scale", "present": true, "confidence": 0.8, "evidence": "A+ = 90"},
            {"item": "Unknown", "present": true, "confidence": 0.8}
        ]});
        let verdicts = validate_response(&value, &items());
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts["Grade scale"].evidence, "A+ = 90");
    }

    #[test]
    fn test_positional_array() {
        let value = json!([
            {"present": true, "confidence": 0.6},
            {"present": false, "confidence": 0.9}
        ]);
        let verdicts = validate_response(&value, &items());
        assert!(verdicts["Late policy"].present);
        assert!(!verdicts["Grade scale"].present);
    }

    #[test]
    fn test_malformed_entries_are_dropped_individually() {
        let value = json!({
            "Late policy": {"present": "yes", "confidence": 0.9},
            "Grade scale": {"present": true, "confidence": 0.75}
        });
        let verdicts = validate_response(&value, &items());
        assert_eq!(verdicts.len(), 1);
        assert!(verdicts.contains_key("Grade scale"));

        let out_of_range = json!({"Late policy": {"present": true, "confidence": 7.5}});
        assert!(validate_response(&out_of_range, &items()).is_empty());
    }

    #[test]
    fn test_wrong_shapes_yield_nothing() {
        assert!(validate_response(&json!("not json"), &items()).is_empty());
        assert!(validate_response(&json!([{"present": true, "confidence": 0.5}]), &items()).is_empty());
    }
}
