//! Not-applicable declarations in the caller's additional context
//!
//! A context sentence such as "This course has no final exam" marks every
//! item whose concept topics it names as not applicable, before any other
//! detector runs.

use shared_types::ChecklistItem;

use crate::patterns::{contains_any, contains_term, sentences, NOT_APPLICABLE_PHRASES};
use crate::rules::Verdict;
use crate::taxonomy::Taxonomy;

/// Topic words identifying the item inside a context sentence
fn topics<'a>(item: &'a ChecklistItem, taxonomy: &'a Taxonomy) -> Vec<&'a str> {
    let from_concepts: Vec<&str> = item
        .concepts
        .iter()
        .filter_map(|name| taxonomy.concept(name))
        .flat_map(|concept| concept.topics.iter().map(String::as_str))
        .collect();
    if from_concepts.is_empty() {
        item.keywords.iter().map(|k| k.term.as_str()).collect()
    } else {
        from_concepts
    }
}

/// A NotApplicable verdict when the context declares the item out of scope
pub fn declared_not_applicable(
    context: &str,
    item: &ChecklistItem,
    taxonomy: &Taxonomy,
) -> Option<Verdict> {
    if context.trim().is_empty() {
        return None;
    }
    let topics = topics(item, taxonomy);
    if topics.is_empty() {
        return None;
    }

    sentences(context).into_iter().find_map(|(_, sentence)| {
        let lower = sentence.to_lowercase();
        if !contains_any(&lower, NOT_APPLICABLE_PHRASES) {
            return None;
        }
        let topic = topics.iter().find(|topic| contains_term(&lower, topic))?;
        Some(
            Verdict::not_applicable(
                0.9,
                format!("The additional context declares this item not applicable (\"{topic}\")."),
            )
            .with_evidence(sentence)
            .with_terms([*topic]),
        )
    })
}
