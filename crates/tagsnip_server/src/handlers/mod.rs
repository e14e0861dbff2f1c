//! HTTP request handlers.

/// Signup, login, refresh and profile endpoints.
pub mod auth;
/// Folder endpoints.
pub mod folder;
/// Liveness endpoints.
pub mod health;
pub(crate) mod normalize;
/// Public read-only snippet sharing.
pub mod share;
/// Snippet CRUD and search endpoints.
pub mod snippet;
/// Open-tab state endpoints.
pub mod tab;
/// Tag endpoints.
pub mod tag;
/// Export, import and stats endpoints.
pub mod transfer;
