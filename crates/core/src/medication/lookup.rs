//! Medication name suggestions
//!
//! The catalogue adapter returns raw matches; ranking lives here so every
//! adapter (remote or the offline fallback list) orders results the same way.

use std::collections::HashSet;

use medminder_domain::constants::MIN_LOOKUP_QUERY_LEN;
use medminder_domain::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ports::MedicationLookup;

/// One suggested medication name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationSuggestion {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
}

impl MedicationSuggestion {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), generic_name: None, manufacturer: None }
    }
}

/// Deduplicate by display name (case-insensitive, first wins) and order
/// names starting with `query` first, then alphabetically.
pub fn rank_suggestions(query: &str, suggestions: Vec<MedicationSuggestion>) -> Vec<MedicationSuggestion> {
    let needle = query.trim().to_lowercase();
    let mut seen = HashSet::new();
    let mut ranked: Vec<(bool, String, MedicationSuggestion)> = suggestions
        .into_iter()
        .filter(|suggestion| !suggestion.display_name.trim().is_empty())
        .filter_map(|suggestion| {
            let key = suggestion.display_name.trim().to_lowercase();
            seen.insert(key.clone()).then(|| (!key.starts_with(&needle), key, suggestion))
        })
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    ranked.into_iter().map(|(_, _, suggestion)| suggestion).collect()
}

/// Search the catalogue. Queries shorter than two characters return nothing
/// without calling the adapter.
pub async fn search_medications(
    lookup: &dyn MedicationLookup,
    query: &str,
) -> Result<Vec<MedicationSuggestion>> {
    let query = query.trim();
    if query.chars().count() < MIN_LOOKUP_QUERY_LEN {
        return Ok(Vec::new());
    }
    let raw = lookup.search(query).await?;
    let ranked = rank_suggestions(query, raw);
    debug!(query, results = ranked.len(), "Medication lookup");
    Ok(ranked)
}
