//! Shared constants used across tagsnip crates.

/// Default API port for tagsnip.
pub const DEFAULT_PORT: u16 = 38412;

/// Default maximum snippet code size accepted by the API layer.
pub const DEFAULT_MAX_SNIPPET_SIZE: usize = 10 * 1024 * 1024;

/// Default auto-save debounce delay in milliseconds.
pub const DEFAULT_AUTO_SAVE_DELAY_MS: u64 = 1_500;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38412";

/// Default and maximum page sizes for snippet listing.
pub const DEFAULT_LIST_SNIPPETS_LIMIT: usize = 100;
/// Upper bound for a single snippet list page.
pub const MAX_LIST_SNIPPETS_LIMIT: usize = 1_000;

/// Title assigned to snippets created without one.
pub const DEFAULT_SNIPPET_TITLE: &str = "Untitled Snippet";
/// Language assigned to snippets created without one.
pub const DEFAULT_SNIPPET_LANGUAGE: &str = "javascript";

/// Maximum snippet title length in characters.
pub const MAX_TITLE_CHARS: usize = 255;
/// Maximum folder and tag name length in characters.
pub const MAX_NAME_CHARS: usize = 100;

/// Access token lifetime default (24 hours).
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 60 * 24;
/// Refresh token lifetime default.
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Number of recent snippets included in stats responses.
pub const STATS_RECENT_SNIPPETS: usize = 5;

/// Version string written into export documents.
pub const EXPORT_FORMAT_VERSION: &str = "2.0";
