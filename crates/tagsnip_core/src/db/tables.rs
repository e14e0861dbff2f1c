//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical snippet rows (`Snippet`, bincode-encoded).
pub const SNIPPETS: TableDefinition<&str, &[u8]> = TableDefinition::new("snippets");
/// Folder rows (`Folder`, bincode-encoded).
pub const FOLDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("folders");
/// Tag rows (`Tag`, bincode-encoded).
pub const TAGS: TableDefinition<&str, &[u8]> = TableDefinition::new("tags");
/// Per-user tab state (`TabsState`, bincode-encoded), keyed by user id.
pub const TABS: TableDefinition<&str, &[u8]> = TableDefinition::new("tabs");
/// User rows (`User`, bincode-encoded).
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
/// Username to user-id index.
pub const USERNAMES: TableDefinition<&str, &str> = TableDefinition::new("usernames");
