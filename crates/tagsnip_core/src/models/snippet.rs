//! Snippet data models and request payloads.

use crate::constants::{DEFAULT_SNIPPET_LANGUAGE, DEFAULT_SNIPPET_TITLE};
use crate::text::normalize_tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored unit of code with its metadata.
///
/// Rows are bincode-encoded in redb, so fields must not be conditionally
/// skipped during serialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a snippet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippetRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

/// Request payload for updating a snippet. Absent fields are left unchanged;
/// an empty `folderId` moves the snippet back to unfiled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSnippetRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

/// Query parameters for listing snippets.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Server-side search parameters (`GET /api/search`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated tag names.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Server-side search body (`POST /api/search`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Search results with their total count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub snippets: Vec<Snippet>,
    pub total: usize,
}

impl Snippet {
    /// Create a new snippet owned by `user_id` with fresh id and timestamps.
    ///
    /// # Arguments
    /// - `title`: Display title.
    /// - `code`: Snippet body.
    /// - `language`: Language identifier.
    ///
    /// # Returns
    /// A new unfiled, non-favorite [`Snippet`] with no tags.
    pub fn new(title: String, code: String, language: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: None,
            code,
            language,
            tags: Vec::new(),
            folder_id: None,
            is_favorite: false,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a snippet from a create payload, applying defaults and tag
    /// normalization. Folder validation is the caller's job.
    pub fn from_create(req: CreateSnippetRequest, user_id: Option<String>) -> Self {
        let title = req
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_SNIPPET_TITLE.to_string());
        let language = req
            .language
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_SNIPPET_LANGUAGE.to_string());
        let mut snippet = Self::new(title, req.code.unwrap_or_default(), language);
        snippet.description = req.description;
        snippet.tags = normalize_tags(req.tags.unwrap_or_default());
        snippet.folder_id = req.folder_id.filter(|f| !f.trim().is_empty());
        snippet.is_favorite = req.is_favorite.unwrap_or(false);
        snippet.user_id = user_id;
        snippet
    }

    /// Apply an update payload in place and bump `updated_at`.
    ///
    /// `updated_at` never moves before `created_at`, even when the wall clock
    /// steps backwards.
    pub fn apply_update(&mut self, update: &UpdateSnippetRequest) {
        if let Some(title) = &update.title {
            let trimmed = title.trim();
            self.title = if trimmed.is_empty() {
                DEFAULT_SNIPPET_TITLE.to_string()
            } else {
                trimmed.to_string()
            };
        }
        if let Some(description) = &update.description {
            self.description = if description.trim().is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(code) = &update.code {
            self.code = code.clone();
        }
        if let Some(language) = &update.language {
            let language = language.trim().to_ascii_lowercase();
            if !language.is_empty() {
                self.language = language;
            }
        }
        if let Some(tags) = &update.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(folder_id) = &update.folder_id {
            let folder_id = folder_id.trim();
            self.folder_id = if folder_id.is_empty() {
                None
            } else {
                Some(folder_id.to_string())
            };
        }
        if let Some(is_favorite) = update.is_favorite {
            self.is_favorite = is_favorite;
        }
        self.touch();
    }

    /// Bump `updated_at` to now, clamped to `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Whether this snippet carries every tag in `required`.
    pub fn has_all_tags(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.tags.iter().any(|t| t == tag))
    }
}

impl UpdateSnippetRequest {
    /// Build a full-snapshot update from the editable fields of `snippet`.
    ///
    /// Used by editing sessions, which always send the whole buffer.
    pub fn snapshot_of(snippet: &Snippet) -> Self {
        Self {
            title: Some(snippet.title.clone()),
            description: Some(snippet.description.clone().unwrap_or_default()),
            code: Some(snippet.code.clone()),
            language: Some(snippet.language.clone()),
            tags: Some(snippet.tags.clone()),
            folder_id: Some(snippet.folder_id.clone().unwrap_or_default()),
            is_favorite: Some(snippet.is_favorite),
        }
    }
}
