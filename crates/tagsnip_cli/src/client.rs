//! reqwest-based client for the tagsnip REST API.
//!
//! Authenticated calls attach the stored access token. A 401 triggers exactly
//! one refresh followed by one retry of the original request; if the refresh
//! is rejected the stored tokens are cleared.

use crate::{ClientError, TokenStore};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tagsnip_core::constants::MAX_LIST_SNIPPETS_LIMIT;
use tagsnip_core::models::folder::{CreateFolderRequest, FolderSummary, UpdateFolderRequest};
use tagsnip_core::models::snippet::{CreateSnippetRequest, Snippet, UpdateSnippetRequest};
use tagsnip_core::models::tab::TabsState;
use tagsnip_core::models::tag::{CleanupResponse, CreateTagRequest, TagSummary};
use tagsnip_core::models::transfer::{ExportDocument, ImportRequest, ImportResult, StatsResponse};
use tagsnip_core::models::user::{Credentials, RefreshRequest, TokenPair, UserProfile};

/// Handle to one tagsnip server. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    server: String,
    tokens: Arc<TokenStore>,
}

/// Build an API URL by appending encoded path segments to `server`.
///
/// # Errors
/// Returns a message if `server` is not a usable base URL.
pub fn api_url(server: &str, segments: &[&str]) -> Result<Url, String> {
    let mut url =
        Url::parse(server).map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

/// Canonical form of a server URL: plain-http `localhost` becomes
/// `127.0.0.1` and trailing slashes are dropped. Unparseable input is
/// returned unchanged.
pub fn normalize_server(server: String) -> String {
    let Ok(mut url) = Url::parse(&server) else {
        return server;
    };
    let is_plain_localhost =
        url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
    if is_plain_localhost && url.set_host(Some("127.0.0.1")).is_err() {
        return server;
    }
    let mut normalized = url.to_string();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Human-readable message for a failed response, preferring the JSON
/// `error` field the server sends.
pub(crate) fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(body)
            .to_string(),
        Err(_) => body.to_string(),
    }
}

fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    let message = error_message_for_response(status, body);
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::BAD_REQUEST
        | StatusCode::CONFLICT
        | StatusCode::UNPROCESSABLE_ENTITY
        | StatusCode::PAYLOAD_TOO_LARGE => ClientError::Validation(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|err| format!("failed to read error response body: {}", err));
    Err(error_for_status(status, &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ClientError::Decode(err.to_string()))
}

impl ApiClient {
    /// Client for `server` with a per-request `timeout`.
    ///
    /// # Errors
    /// Returns [`ClientError::Validation`] for an unusable server URL and
    /// [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(server: &str, timeout: Duration, tokens: TokenStore) -> Result<Self, ClientError> {
        let server = normalize_server(server.to_string());
        api_url(&server, &[]).map_err(ClientError::Validation)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            server,
            tokens: Arc::new(tokens),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut full = Vec::with_capacity(segments.len() + 1);
        full.push("api");
        full.extend_from_slice(segments);
        api_url(&self.server, &full).map_err(ClientError::Validation)
    }

    /// Send an authenticated request built by `build`, refreshing once on 401.
    async fn send_authed<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder + Send,
    {
        let Some(tokens) = self.tokens.get() else {
            return Err(ClientError::Unauthorized);
        };
        let response = build(&self.http)
            .bearer_auth(&tokens.access_token)
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return checked(response).await;
        }

        tracing::debug!("access token rejected; refreshing once");
        let refreshed = match self.refresh_with(&tokens.refresh_token).await {
            Ok(pair) => pair,
            Err(ClientError::Transport(err)) => return Err(ClientError::Transport(err)),
            Err(err) => {
                tracing::debug!("refresh failed: {}", err);
                self.tokens.clear()?;
                return Err(ClientError::Unauthorized);
            }
        };
        let retry = build(&self.http)
            .bearer_auth(&refreshed.access_token)
            .send()
            .await?;
        checked(retry).await
    }

    async fn refresh_with(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let url = self.url(&["auth", "refresh"])?;
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = checked(self.http.post(url).json(&body).send().await?).await?;
        let pair: TokenPair = decode(response).await?;
        self.tokens.set(pair.clone())?;
        Ok(pair)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.url(segments)?;
        decode(self.send_authed(|http| http.get(url.clone())).await?).await
    }

    // Account

    /// Register a new account. Does not sign in.
    pub async fn signup(&self, credentials: &Credentials) -> Result<UserProfile, ClientError> {
        let url = self.url(&["auth", "signup"])?;
        let response = checked(self.http.post(url).json(credentials).send().await?).await?;
        decode(response).await
    }

    /// Sign in and persist the issued tokens.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, ClientError> {
        let url = self.url(&["auth", "login"])?;
        let response = self.http.post(url).json(credentials).send().await?;
        let response = match checked(response).await {
            Ok(response) => response,
            Err(ClientError::Unauthorized) => {
                return Err(ClientError::Validation(
                    "Invalid username or password".to_string(),
                ))
            }
            Err(err) => return Err(err),
        };
        let pair: TokenPair = decode(response).await?;
        self.tokens.set(pair.clone())?;
        Ok(pair)
    }

    /// Forget the stored tokens.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens.clear()
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.get_json(&["auth", "me"]).await
    }

    // Snippets

    /// Newest-first page of the caller's snippets.
    pub async fn list_snippets(&self, limit: usize) -> Result<Vec<Snippet>, ClientError> {
        let url = self.url(&["snippets"])?;
        let limit = limit.to_string();
        let response = self
            .send_authed(|http| http.get(url.clone()).query(&[("limit", limit.as_str())]))
            .await?;
        decode(response).await
    }

    pub async fn get_snippet(&self, id: &str) -> Result<Snippet, ClientError> {
        self.get_json(&["snippets", id]).await
    }

    pub async fn create_snippet(&self, fields: &CreateSnippetRequest) -> Result<Snippet, ClientError> {
        let url = self.url(&["snippets"])?;
        let response = self
            .send_authed(|http| http.post(url.clone()).json(fields))
            .await?;
        decode(response).await
    }

    pub async fn update_snippet(
        &self,
        id: &str,
        fields: &UpdateSnippetRequest,
    ) -> Result<Snippet, ClientError> {
        let url = self.url(&["snippets", id])?;
        let response = self
            .send_authed(|http| http.put(url.clone()).json(fields))
            .await?;
        decode(response).await
    }

    pub async fn delete_snippet(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&["snippets", id])?;
        self.send_authed(|http| http.delete(url.clone())).await?;
        Ok(())
    }

    pub async fn toggle_favorite(&self, id: &str) -> Result<Snippet, ClientError> {
        let url = self.url(&["snippets", id, "favorite"])?;
        decode(self.send_authed(|http| http.post(url.clone())).await?).await
    }

    // Folders

    pub async fn list_folders(&self) -> Result<Vec<FolderSummary>, ClientError> {
        self.get_json(&["folders"]).await
    }

    pub async fn create_folder(&self, fields: &CreateFolderRequest) -> Result<FolderSummary, ClientError> {
        let url = self.url(&["folders"])?;
        let response = self
            .send_authed(|http| http.post(url.clone()).json(fields))
            .await?;
        decode(response).await
    }

    pub async fn update_folder(
        &self,
        id: &str,
        fields: &UpdateFolderRequest,
    ) -> Result<FolderSummary, ClientError> {
        let url = self.url(&["folders", id])?;
        let response = self
            .send_authed(|http| http.put(url.clone()).json(fields))
            .await?;
        decode(response).await
    }

    /// Delete a folder. Its snippets become unfiled.
    pub async fn delete_folder(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&["folders", id])?;
        self.send_authed(|http| http.delete(url.clone())).await?;
        Ok(())
    }

    // Tags

    pub async fn list_tags(&self) -> Result<Vec<TagSummary>, ClientError> {
        self.get_json(&["tags"]).await
    }

    pub async fn create_tag(&self, name: &str) -> Result<TagSummary, ClientError> {
        let url = self.url(&["tags"])?;
        let body = CreateTagRequest {
            name: name.to_string(),
        };
        let response = self
            .send_authed(|http| http.post(url.clone()).json(&body))
            .await?;
        decode(response).await
    }

    pub async fn delete_tag(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&["tags", id])?;
        self.send_authed(|http| http.delete(url.clone())).await?;
        Ok(())
    }

    /// Drop tags no snippet references. Returns the number removed.
    pub async fn cleanup_tags(&self) -> Result<usize, ClientError> {
        let url = self.url(&["tags", "cleanup"])?;
        let response: CleanupResponse =
            decode(self.send_authed(|http| http.post(url.clone())).await?).await?;
        Ok(response.removed)
    }

    // Tabs

    pub async fn get_tabs(&self) -> Result<TabsState, ClientError> {
        self.get_json(&["tabs"]).await
    }

    pub async fn put_tabs(&self, tabs: &TabsState) -> Result<(), ClientError> {
        let url = self.url(&["tabs"])?;
        self.send_authed(|http| http.put(url.clone()).json(tabs))
            .await?;
        Ok(())
    }

    // Transfer

    pub async fn export(&self) -> Result<ExportDocument, ClientError> {
        self.get_json(&["export"]).await
    }

    pub async fn import(&self, request: &ImportRequest) -> Result<ImportResult, ClientError> {
        let url = self.url(&["import"])?;
        let response = self
            .send_authed(|http| http.post(url.clone()).json(request))
            .await?;
        decode(response).await
    }

    pub async fn stats(&self) -> Result<StatsResponse, ClientError> {
        self.get_json(&["stats"]).await
    }

    /// Read-only view of a shared snippet. Needs no sign-in.
    pub async fn shared_snippet(&self, id: &str) -> Result<Snippet, ClientError> {
        let url = self.url(&["share", id])?;
        decode(checked(self.http.get(url).send().await?).await?).await
    }

    /// Every snippet the caller owns, up to the server's page ceiling.
    pub async fn all_snippets(&self) -> Result<Vec<Snippet>, ClientError> {
        self.list_snippets(MAX_LIST_SNIPPETS_LIMIT).await
    }
}
