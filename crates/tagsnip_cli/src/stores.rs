//! Remote-store trait implementations backed by [`ApiClient`].
//!
//! These let the core's tab manager, auto-save controller and filter
//! pipeline run against a live server.

use crate::ApiClient;
use async_trait::async_trait;
use tagsnip_core::models::folder::{CreateFolderRequest, FolderSummary, UpdateFolderRequest};
use tagsnip_core::models::snippet::{CreateSnippetRequest, Snippet, UpdateSnippetRequest};
use tagsnip_core::models::tab::TabsState;
use tagsnip_core::models::tag::TagSummary;
use tagsnip_core::remote::{
    FolderStore, RemoteError, SnippetSaver, SnippetStore, TabStore, TagStore,
};

#[async_trait]
impl SnippetStore for ApiClient {
    async fn list(&self) -> Result<Vec<Snippet>, RemoteError> {
        Ok(self.all_snippets().await?)
    }

    async fn get(&self, id: &str) -> Result<Snippet, RemoteError> {
        Ok(self.get_snippet(id).await?)
    }

    async fn create(&self, fields: CreateSnippetRequest) -> Result<Snippet, RemoteError> {
        Ok(self.create_snippet(&fields).await?)
    }

    async fn update(&self, id: &str, fields: UpdateSnippetRequest) -> Result<Snippet, RemoteError> {
        Ok(self.update_snippet(id, &fields).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        Ok(self.delete_snippet(id).await?)
    }

    async fn toggle_favorite(&self, id: &str) -> Result<Snippet, RemoteError> {
        Ok(ApiClient::toggle_favorite(self, id).await?)
    }
}

#[async_trait]
impl FolderStore for ApiClient {
    async fn list(&self) -> Result<Vec<FolderSummary>, RemoteError> {
        Ok(self.list_folders().await?)
    }

    async fn create(&self, fields: CreateFolderRequest) -> Result<FolderSummary, RemoteError> {
        Ok(self.create_folder(&fields).await?)
    }

    async fn update(&self, id: &str, fields: UpdateFolderRequest) -> Result<FolderSummary, RemoteError> {
        Ok(self.update_folder(id, &fields).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        Ok(self.delete_folder(id).await?)
    }
}

#[async_trait]
impl TagStore for ApiClient {
    async fn list(&self) -> Result<Vec<TagSummary>, RemoteError> {
        Ok(self.list_tags().await?)
    }

    async fn create(&self, name: &str) -> Result<TagSummary, RemoteError> {
        Ok(self.create_tag(name).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        Ok(self.delete_tag(id).await?)
    }
}

#[async_trait]
impl TabStore for ApiClient {
    async fn get(&self) -> Result<TabsState, RemoteError> {
        Ok(self.get_tabs().await?)
    }

    async fn put(&self, tabs: TabsState) -> Result<(), RemoteError> {
        Ok(self.put_tabs(&tabs).await?)
    }
}

#[async_trait]
impl SnippetSaver for ApiClient {
    async fn save(&self, id: &str, snapshot: UpdateSnippetRequest) -> Result<Snippet, RemoteError> {
        Ok(self.update_snippet(id, &snapshot).await?)
    }
}
