//! Core domain library for tagsnip (models, storage, search, editing state).

/// Debounced auto-save controller for editing sessions.
pub mod autosave;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across tagsnip crates.
pub mod constants;
/// Database access layer and transactions.
pub mod db;
/// Heuristic language detection.
pub mod detection;
/// Application error types (storage/domain).
pub mod error;
/// Data models for API requests and persistence.
pub mod models;
/// Contracts for the remote stores the client-side components talk to.
pub mod remote;
/// Fuzzy search index and the snippet filter pipeline.
pub mod search;
/// Persisted user settings with per-category defaults.
pub mod settings;
/// Open-tab state machine.
pub mod tabs;
/// Shared text normalization helpers.
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_AUTO_SAVE_DELAY_MS, DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};
pub use db::Database;
pub use error::AppError;
