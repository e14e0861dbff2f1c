//! Filter state, the filtered view, and the client-side snippet cache.

use super::{SearchHit, SearchIndex};
use crate::models::snippet::Snippet;

/// The user's current narrowing choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub tags: Vec<String>,
    pub folder_id: Option<String>,
    pub favorites_only: bool,
}

impl FilterState {
    /// Select `tag` if unselected, otherwise deselect it.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    /// Reset every filter.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drop the folder selection if it refers to `folder_id`.
    pub fn forget_folder(&mut self, folder_id: &str) {
        if self.folder_id.as_deref() == Some(folder_id) {
            self.folder_id = None;
        }
    }

    /// Whether any filter narrows the collection.
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
            || !self.tags.is_empty()
            || self.folder_id.is_some()
            || self.favorites_only
    }
}

/// One row of the filtered view.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub snippet: &'a Snippet,
    /// Search relevance (higher is better) when a query was applied.
    pub relevance: Option<f64>,
}

/// Ordered, narrowed view over a snippet collection.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    pub hits: Vec<Hit<'a>>,
}

impl<'a> FilteredView<'a> {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Snippets in view order.
    pub fn snippets(&self) -> impl Iterator<Item = &'a Snippet> + '_ {
        self.hits.iter().map(|hit| hit.snippet)
    }

    /// Snippet ids in view order.
    pub fn ids(&self) -> Vec<&'a str> {
        self.hits.iter().map(|hit| hit.snippet.id.as_str()).collect()
    }
}

/// Why a view has nothing to show. Each case gets its own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The user is not signed in.
    Unauthorized,
    /// The user has no snippets at all.
    NoSnippets,
    /// Snippets exist but the filters excluded all of them.
    NoMatches,
}

impl EmptyState {
    /// User-facing message.
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::Unauthorized => "Sign in to see your snippets.",
            EmptyState::NoSnippets => "No snippets yet. Create your first snippet to get started.",
            EmptyState::NoMatches => "No snippets match the current filters.",
        }
    }
}

/// Narrow `snippets` according to `state`.
///
/// Steps, each intersecting the previous result: a non-empty query replaces
/// the candidates with ranked fuzzy hits; selected tags must all be present;
/// a selected folder must match exactly; favorites-only keeps favorites.
/// Without a query, candidates keep their collection order.
///
/// `index` must have been built from `snippets`.
pub fn recompute<'a>(snippets: &'a [Snippet], index: &SearchIndex, state: &FilterState) -> FilteredView<'a> {
    let candidates: Vec<Hit<'a>> = if state.query.trim().is_empty() {
        snippets
            .iter()
            .map(|snippet| Hit {
                snippet,
                relevance: None,
            })
            .collect()
    } else {
        index
            .search(&state.query)
            .into_iter()
            .filter_map(|hit: SearchHit| {
                snippets.get(hit.index).map(|snippet| Hit {
                    snippet,
                    relevance: Some(hit.relevance()),
                })
            })
            .collect()
    };

    let hits = candidates
        .into_iter()
        .filter(|hit| state.tags.is_empty() || hit.snippet.has_all_tags(&state.tags))
        .filter(|hit| match &state.folder_id {
            Some(folder_id) => hit.snippet.folder_id.as_ref() == Some(folder_id),
            None => true,
        })
        .filter(|hit| !state.favorites_only || hit.snippet.is_favorite)
        .collect();

    FilteredView { hits }
}

/// Client-side cache of the user's snippets plus the derived search index.
///
/// Every mutation rebuilds the index, so views computed afterwards always
/// reflect the current collection.
#[derive(Debug, Clone, Default)]
pub struct SnippetCollection {
    snippets: Vec<Snippet>,
    index: SearchIndex,
}

impl SnippetCollection {
    /// Build a collection from snippets in display order.
    pub fn new(snippets: Vec<Snippet>) -> Self {
        let index = SearchIndex::build(&snippets);
        Self { snippets, index }
    }

    fn reindex(&mut self) {
        self.index = SearchIndex::build(&self.snippets);
    }

    /// Snippets in display order.
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    /// Number of cached snippets.
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Look up a cached snippet.
    pub fn get(&self, id: &str) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    /// Replace the whole cache, e.g. after a fresh list from the server.
    pub fn replace_all(&mut self, snippets: Vec<Snippet>) {
        self.snippets = snippets;
        self.reindex();
    }

    /// A newly created snippet goes to the front.
    pub fn apply_created(&mut self, snippet: Snippet) {
        self.snippets.retain(|s| s.id != snippet.id);
        self.snippets.insert(0, snippet);
        self.reindex();
    }

    /// Replace an updated snippet and re-sort by `updated_at`, newest first.
    pub fn apply_updated(&mut self, snippet: Snippet) {
        match self.snippets.iter_mut().find(|s| s.id == snippet.id) {
            Some(slot) => *slot = snippet,
            None => self.snippets.push(snippet),
        }
        self.snippets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        self.reindex();
    }

    /// Replace a snippet after a favorite toggle, keeping its position.
    pub fn apply_favorite(&mut self, snippet: Snippet) {
        if let Some(slot) = self.snippets.iter_mut().find(|s| s.id == snippet.id) {
            *slot = snippet;
            self.reindex();
        }
    }

    /// Remove a deleted snippet.
    ///
    /// # Returns
    /// `true` when the snippet was cached.
    pub fn apply_deleted(&mut self, id: &str) -> bool {
        let before = self.snippets.len();
        self.snippets.retain(|s| s.id != id);
        let removed = self.snippets.len() != before;
        if removed {
            self.reindex();
        }
        removed
    }

    /// Mirror a server-side folder delete: member snippets become unfiled.
    ///
    /// # Returns
    /// Number of snippets moved to unfiled.
    pub fn apply_folder_deleted(&mut self, folder_id: &str) -> usize {
        let mut moved = 0;
        for snippet in &mut self.snippets {
            if snippet.folder_id.as_deref() == Some(folder_id) {
                snippet.folder_id = None;
                moved += 1;
            }
        }
        moved
    }

    /// Distinct tags across the cache, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .snippets
            .iter()
            .flat_map(|s| s.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    /// Compute the filtered view for `state`.
    pub fn recompute(&self, state: &FilterState) -> FilteredView<'_> {
        recompute(&self.snippets, &self.index, state)
    }

    /// Classify why `view` might be empty.
    ///
    /// # Returns
    /// `None` when there is something to show.
    pub fn empty_state(&self, view: &FilteredView<'_>, authorized: bool) -> Option<EmptyState> {
        if !authorized {
            Some(EmptyState::Unauthorized)
        } else if self.snippets.is_empty() {
            Some(EmptyState::NoSnippets)
        } else if view.is_empty() {
            Some(EmptyState::NoMatches)
        } else {
            None
        }
    }
}
