//! Contracts for the remote stores the client-side components talk to.
//!
//! The HTTP client implements these against the tagsnip server; tests use
//! in-memory fakes.

use crate::models::folder::{CreateFolderRequest, FolderSummary, UpdateFolderRequest};
use crate::models::snippet::{CreateSnippetRequest, Snippet, UpdateSnippetRequest};
use crate::models::tab::TabsState;
use crate::models::tag::TagSummary;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a remote operation, as seen by client-side components.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("not signed in")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("remote operation failed: {0}")]
    Failed(String),
}

/// Snippet CRUD.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Snippet>, RemoteError>;
    async fn get(&self, id: &str) -> Result<Snippet, RemoteError>;
    async fn create(&self, fields: CreateSnippetRequest) -> Result<Snippet, RemoteError>;
    async fn update(&self, id: &str, fields: UpdateSnippetRequest) -> Result<Snippet, RemoteError>;
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;
    async fn toggle_favorite(&self, id: &str) -> Result<Snippet, RemoteError>;
}

/// Folder CRUD. Deleting a folder unfiles its snippets server-side.
#[async_trait]
pub trait FolderStore: Send + Sync {
    async fn list(&self) -> Result<Vec<FolderSummary>, RemoteError>;
    async fn create(&self, fields: CreateFolderRequest) -> Result<FolderSummary, RemoteError>;
    async fn update(&self, id: &str, fields: UpdateFolderRequest) -> Result<FolderSummary, RemoteError>;
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;
}

/// Tag listing and maintenance.
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn list(&self) -> Result<Vec<TagSummary>, RemoteError>;
    async fn create(&self, name: &str) -> Result<TagSummary, RemoteError>;
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;
}

/// Persisted tab state.
#[async_trait]
pub trait TabStore: Send + Sync {
    async fn get(&self) -> Result<TabsState, RemoteError>;
    async fn put(&self, tabs: TabsState) -> Result<(), RemoteError>;
}

/// The single operation the auto-save controller needs.
#[async_trait]
pub trait SnippetSaver: Send + Sync {
    async fn save(&self, id: &str, snapshot: UpdateSnippetRequest) -> Result<Snippet, RemoteError>;
}

