//! Tag data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Explicit tag row. Snippets reference tags by name; rows give tags a
/// stable id for deletion and outlive their last snippet until cleanup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Tag with its derived usage count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub id: String,
    pub name: String,
    pub snippet_count: usize,
}

/// Request payload for creating a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

/// Result of an orphaned-tag cleanup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupResponse {
    pub removed: usize,
}

impl Tag {
    /// Create a tag row for an already-normalized name.
    pub fn new(name: String, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            user_id,
            created_at: Utc::now(),
        }
    }
}
