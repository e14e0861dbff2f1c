//! Shared test-only helpers for tagsnip_core.

use crate::models::snippet::Snippet;
use crate::models::user::User;
use crate::Database;
use tempfile::TempDir;

/// Fresh database in its own directory. Dropping the [`TempDir`] deletes it.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("db");
    let db = Database::new(&path.to_string_lossy()).expect("open db");
    (db, dir)
}

/// Insert a user and return its id.
pub(crate) fn create_user(db: &Database, username: &str) -> String {
    let user = User::new(username.to_string(), "hash".to_string());
    db.users.create(&user).expect("create user");
    user.id
}

/// Snippet fixture with the given title, code and tags.
pub(crate) fn snippet(title: &str, code: &str, tags: &[&str]) -> Snippet {
    let mut snippet = Snippet::new(title.to_string(), code.to_string(), "javascript".to_string());
    snippet.tags = tags.iter().map(|t| t.to_string()).collect();
    snippet
}
