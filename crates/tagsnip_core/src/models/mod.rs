//! Data models for persistence and the HTTP wire format.

/// Folder models and colors.
pub mod folder;
/// Snippet models and request payloads.
pub mod snippet;
/// Persisted tab-state models.
pub mod tab;
/// Tag models.
pub mod tag;
/// Export, import and stats documents.
pub mod transfer;
/// User accounts and auth payloads.
pub mod user;

#[cfg(test)]
mod tests;
