//! Client-side application of the combined predicate.
//!
//! `type` is resolved by the server; the remaining fields narrow the fetched
//! collection in a fixed order: status, category, search, flagged.

use crate::filters::FilterSet;
use crate::model::Artifact;

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

pub fn matches_type(artifact: &Artifact, kind: &str) -> bool {
    kind.is_empty() || artifact.kind == kind
}

pub fn matches_status(artifact: &Artifact, status: &str) -> bool {
    status.is_empty() || artifact.status == status
}

pub fn matches_category(artifact: &Artifact, category: &str) -> bool {
    if category.is_empty() {
        return true;
    }
    contains_ci(&artifact.category, &category.to_lowercase())
}

pub fn matches_search(artifact: &Artifact, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    contains_ci(&artifact.summary, &query)
        || contains_ci(&artifact.description, &query)
        || contains_ci(&artifact.category, &query)
}

/// `false` means the flag filter is off, not "unflagged only".
pub fn matches_flagged(artifact: &Artifact, flagged: bool) -> bool {
    !flagged || artifact.flagged
}

/// Narrow an already type-filtered collection.
pub fn apply_client_filters(artifacts: &[Artifact], filters: &FilterSet) -> Vec<Artifact> {
    artifacts
        .iter()
        .filter(|a| matches_status(a, &filters.status))
        .filter(|a| matches_category(a, &filters.category))
        .filter(|a| matches_search(a, &filters.search))
        .filter(|a| matches_flagged(a, filters.flagged))
        .cloned()
        .collect()
}

/// Full predicate over an in-memory collection, `type` included.
pub fn apply_filters(artifacts: &[Artifact], filters: &FilterSet) -> Vec<Artifact> {
    let typed: Vec<Artifact> = artifacts
        .iter()
        .filter(|a| matches_type(a, &filters.kind))
        .cloned()
        .collect();
    apply_client_filters(&typed, filters)
}
