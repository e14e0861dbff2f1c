//! Fuzzy search index and the snippet filter pipeline.

mod filter;
/// Approximate substring matching primitives.
pub mod fuzzy;
#[cfg(test)]
mod tests;

pub use filter::{recompute, EmptyState, FilterState, FilteredView, Hit, SnippetCollection};

use crate::models::snippet::Snippet;
use fuzzy::{IndexedText, Pattern, DEFAULT_THRESHOLD};

/// Relative importance of each searchable field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub title: f64,
    pub code: f64,
    pub tags: f64,
    pub description: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 0.4,
            code: 0.3,
            tags: 0.2,
            description: 0.1,
        }
    }
}

impl FieldWeights {
    /// Scale weights so they sum to 1. All-zero weights fall back to equal
    /// weighting.
    fn normalized(self) -> Self {
        let sum = self.title + self.code + self.tags + self.description;
        if sum <= 0.0 {
            return Self {
                title: 0.25,
                code: 0.25,
                tags: 0.25,
                description: 0.25,
            };
        }
        Self {
            title: self.title / sum,
            code: self.code / sum,
            tags: self.tags / sum,
            description: self.description / sum,
        }
    }
}

/// Index tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub weights: FieldWeights,
    /// Maximum normalized error for a field to count as matched.
    pub threshold: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// A ranked search result referring to a position in the indexed slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub index: usize,
    /// Combined score: 0 is a perfect match, 1 the worst.
    pub score: f64,
}

impl SearchHit {
    /// Relevance used for display and ranking (higher is better).
    pub fn relevance(&self) -> f64 {
        1.0 - self.score
    }
}

#[derive(Debug, Clone)]
struct IndexedSnippet {
    title: IndexedText,
    code: IndexedText,
    tags: Vec<IndexedText>,
    description: Option<IndexedText>,
}

impl IndexedSnippet {
    fn new(snippet: &Snippet) -> Self {
        Self {
            title: IndexedText::new(&snippet.title),
            code: IndexedText::new(&snippet.code),
            tags: snippet.tags.iter().map(|t| IndexedText::new(t)).collect(),
            description: snippet.description.as_deref().map(IndexedText::new),
        }
    }
}

/// Weighted fuzzy index over title, code, tags and description.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexedSnippet>,
    options: SearchOptions,
}

impl SearchIndex {
    /// Index `snippets` with default options.
    pub fn build(snippets: &[Snippet]) -> Self {
        Self::with_options(snippets, SearchOptions::default())
    }

    /// Index `snippets` with custom weights and threshold.
    pub fn with_options(snippets: &[Snippet], options: SearchOptions) -> Self {
        Self {
            entries: snippets.iter().map(IndexedSnippet::new).collect(),
            options: SearchOptions {
                weights: options.weights.normalized(),
                threshold: options.threshold.clamp(0.0, 1.0),
            },
        }
    }

    /// Number of indexed snippets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search the index.
    ///
    /// Each matched field contributes `score ^ (weight * norm)` to a product
    /// (a perfect match contributes `f64::EPSILON ^ ...`); snippets with no
    /// matched field are dropped. Results are ordered best-first, ties in
    /// index order.
    ///
    /// # Returns
    /// Hits referring to positions in the slice the index was built from.
    /// A blank query yields no hits.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let Some(pattern) = Pattern::new(query) else {
            return Vec::new();
        };
        let threshold = self.options.threshold;
        let weights = self.options.weights;

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let mut matched = false;
                let mut total = 1.0f64;
                let mut apply = |text: &IndexedText, weight: f64| {
                    if let Some(score) = pattern.score(&text.chars, threshold) {
                        matched = true;
                        let base = if score == 0.0 { f64::EPSILON } else { score };
                        total *= base.powf(weight * text.norm);
                    }
                };

                apply(&entry.title, weights.title);
                apply(&entry.code, weights.code);
                for tag in &entry.tags {
                    apply(tag, weights.tags);
                }
                if let Some(description) = &entry.description {
                    apply(description, weights.description);
                }

                matched.then_some(SearchHit {
                    index,
                    score: total,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.index.cmp(&b.index)));
        hits
    }
}
