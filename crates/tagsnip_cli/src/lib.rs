//! HTTP client for the tagsnip API and the state the `tsnip` CLI keeps locally.

/// reqwest-based API client with one-shot token refresh.
pub mod client;
/// Client-side error taxonomy.
pub mod error;
/// Remote-store trait implementations backed by [`ApiClient`].
pub mod stores;
/// Persisted access/refresh tokens.
pub mod tokens;
/// Checks performed before any request is sent.
pub mod validate;

pub use client::{api_url, normalize_server, ApiClient};
pub use error::ClientError;
pub use tokens::{TokenStore, TOKENS_FILE_NAME};
