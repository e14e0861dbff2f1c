//! Folder data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Display color for a folder. Unknown names are rejected at the boundary.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FolderColor {
    #[default]
    Default,
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Purple,
    Pink,
}

impl FolderColor {
    /// Every color in display order.
    pub const ALL: [FolderColor; 9] = [
        FolderColor::Default,
        FolderColor::Red,
        FolderColor::Orange,
        FolderColor::Yellow,
        FolderColor::Green,
        FolderColor::Teal,
        FolderColor::Blue,
        FolderColor::Purple,
        FolderColor::Pink,
    ];

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            FolderColor::Default => "default",
            FolderColor::Red => "red",
            FolderColor::Orange => "orange",
            FolderColor::Yellow => "yellow",
            FolderColor::Green => "green",
            FolderColor::Teal => "teal",
            FolderColor::Blue => "blue",
            FolderColor::Purple => "purple",
            FolderColor::Pink => "pink",
        }
    }
}

impl fmt::Display for FolderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FolderColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == wanted)
            .ok_or_else(|| format!("unknown folder color '{}'", s))
    }
}

/// Folder row stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub color: FolderColor,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Folder as returned by the API, with its derived snippet count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FolderSummary {
    pub id: String,
    pub name: String,
    pub color: FolderColor,
    pub snippet_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<FolderColor>,
}

/// Request payload for updating a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<FolderColor>,
}

impl Folder {
    /// Create a new folder owned by `user_id`.
    pub fn new(name: String, color: FolderColor, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            color,
            user_id,
            created_at: Utc::now(),
        }
    }

    /// Pair this folder with a snippet count for API responses.
    pub fn summarize(&self, snippet_count: usize) -> FolderSummary {
        FolderSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            color: self.color,
            snippet_count,
            created_at: self.created_at,
        }
    }
}
