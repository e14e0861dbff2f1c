//! Snippet storage operations backed by redb.

use super::tables::SNIPPETS;
use super::{decode, encode};
use crate::error::AppError;
use crate::models::snippet::{SearchRequest, Snippet};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the `snippets` table.
pub struct SnippetDb {
    db: Arc<redb::Database>,
}

pub(crate) fn owned_by(snippet: &Snippet, user_id: &str) -> bool {
    snippet.user_id.as_deref() == Some(user_id)
}

pub(crate) fn sort_newest_first(snippets: &mut [Snippet]) {
    snippets.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn matches_search(snippet: &Snippet, needle: &str, request: &SearchRequest, tags: &[String]) -> bool {
    if !needle.is_empty() {
        let hit = snippet.title.to_lowercase().contains(needle)
            || snippet.code.to_lowercase().contains(needle)
            || snippet
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle));
        if !hit {
            return false;
        }
    }
    if let Some(language) = request.language.as_deref().map(str::trim) {
        if !language.is_empty() && !snippet.language.eq_ignore_ascii_case(language) {
            return false;
        }
    }
    snippet.has_all_tags(tags)
}

impl SnippetDb {
    /// Initialize the snippet table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(SNIPPETS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a snippet row as-is.
    ///
    /// Most callers want [`crate::db::TransactionOps::create_snippet`], which
    /// also validates the folder and registers tags.
    ///
    /// # Errors
    /// Returns a storage error when the id already exists.
    pub fn insert(&self, snippet: &Snippet) -> Result<(), AppError> {
        let encoded = encode(snippet)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNIPPETS)?;
            if table.get(snippet.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Snippet id '{}' already exists",
                    snippet.id
                )));
            }
            table.insert(snippet.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a snippet by id regardless of owner.
    ///
    /// # Returns
    /// `Ok(Some(snippet))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Snippet>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNIPPETS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a snippet by id only if `user_id` owns it.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_owned(&self, user_id: &str, id: &str) -> Result<Option<Snippet>, AppError> {
        Ok(self.get(id)?.filter(|s| owned_by(s, user_id)))
    }

    /// Every snippet owned by `user_id`, newest `updated_at` first.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn all_for_user(&self, user_id: &str) -> Result<Vec<Snippet>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNIPPETS)?;
        let mut snippets = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            let snippet: Snippet = decode(value.value())?;
            if owned_by(&snippet, user_id) {
                snippets.push(snippet);
            }
        }
        sort_newest_first(&mut snippets);
        Ok(snippets)
    }

    /// One page of a user's snippets, newest first.
    ///
    /// # Arguments
    /// - `user_id`: Owner.
    /// - `limit`: Maximum rows to return.
    /// - `offset`: Rows to skip.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list(&self, user_id: &str, limit: usize, offset: usize) -> Result<Vec<Snippet>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self
            .all_for_user(user_id)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    /// Case-insensitive substring search over title, code and description,
    /// narrowed by language and (AND) tags.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn search(&self, user_id: &str, request: &SearchRequest) -> Result<Vec<Snippet>, AppError> {
        let needle = request.query.trim().to_lowercase();
        let tags = crate::text::normalize_tags(&request.tags);
        Ok(self
            .all_for_user(user_id)?
            .into_iter()
            .filter(|snippet| matches_search(snippet, &needle, request, &tags))
            .collect())
    }

    /// Flip the favorite flag of an owned snippet.
    ///
    /// # Returns
    /// The updated snippet, or `None` when missing or not owned.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn toggle_favorite(&self, user_id: &str, id: &str) -> Result<Option<Snippet>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(SNIPPETS)?;
            let Some(guard) = table.get(id)? else {
                return Ok(None);
            };
            let mut snippet: Snippet = decode(guard.value())?;
            drop(guard);
            if !owned_by(&snippet, user_id) {
                return Ok(None);
            }
            snippet.is_favorite = !snippet.is_favorite;
            snippet.touch();
            let encoded = encode(&snippet)?;
            table.insert(id, encoded.as_slice())?;
            snippet
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete an owned snippet.
    ///
    /// # Returns
    /// `true` when a row was deleted.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete(&self, user_id: &str, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNIPPETS)?;
            let Some(guard) = table.get(id)? else {
                return Ok(false);
            };
            let snippet: Snippet = decode(guard.value())?;
            drop(guard);
            if !owned_by(&snippet, user_id) {
                return Ok(false);
            }
            table.remove(id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }
}
