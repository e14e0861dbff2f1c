//! Export, import and stats documents.

use super::snippet::Snippet;
use super::tag::TagSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full export of a user's snippets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub snippets: Vec<Snippet>,
    #[serde(default)]
    pub tags: Vec<TagSummary>,
}

/// One snippet in an import payload. Export documents carry full snippets,
/// which deserialize into this shape with their extra fields ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSnippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Import request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub snippets: Vec<ImportSnippet>,
}

/// Import outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Aggregate statistics over a user's snippets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_snippets: usize,
    pub total_tags: usize,
    pub language_distribution: BTreeMap<String, usize>,
    pub recent_snippets: Vec<Snippet>,
}

impl ExportDocument {
    /// Export document stamped with the current format version and time.
    pub fn new(snippets: Vec<Snippet>, tags: Vec<TagSummary>) -> Self {
        Self {
            version: crate::constants::EXPORT_FORMAT_VERSION.to_string(),
            exported_at: chrono::Utc::now(),
            snippets,
            tags,
        }
    }
}

impl StatsResponse {
    /// Summarize `snippets`, which must already be sorted newest first.
    pub fn from_snippets(snippets: &[Snippet], total_tags: usize) -> Self {
        let mut language_distribution = BTreeMap::new();
        for snippet in snippets {
            *language_distribution
                .entry(snippet.language.clone())
                .or_insert(0) += 1;
        }
        Self {
            total_snippets: snippets.len(),
            total_tags,
            language_distribution,
            recent_snippets: snippets
                .iter()
                .take(crate::constants::STATS_RECENT_SNIPPETS)
                .cloned()
                .collect(),
        }
    }
}
