//! Atomic cross-table operations.
//!
//! Each helper runs inside a single redb write transaction, so readers never
//! observe a folder deleted while its snippets still point at it, or a tag
//! row removed while snippets still carry the name.

use super::snippet::owned_by;
use super::tables::{FOLDERS, SNIPPETS, TAGS};
use super::tag::ensure_tags_in_txn;
use super::{decode, encode, Database};
use crate::constants::MAX_TITLE_CHARS;
use crate::error::AppError;
use crate::models::folder::Folder;
use crate::models::snippet::{CreateSnippetRequest, Snippet, UpdateSnippetRequest};
use crate::models::tag::Tag;
use crate::models::transfer::{ImportResult, ImportSnippet};
use crate::text::char_len;
use redb::ReadableTable;

/// Atomic operations that touch several tables together.
pub struct TransactionOps;

/// Keep `folder_id` only when it names a folder owned by `user_id`.
fn resolve_folder_in_txn(
    folders: &redb::Table<&'static str, &'static [u8]>,
    user_id: &str,
    folder_id: Option<String>,
) -> Result<Option<String>, AppError> {
    let Some(folder_id) = folder_id else {
        return Ok(None);
    };
    let Some(guard) = folders.get(folder_id.as_str())? else {
        tracing::debug!("ignoring unknown folder id {}", folder_id);
        return Ok(None);
    };
    let folder: Folder = decode(guard.value())?;
    Ok((folder.user_id == user_id).then_some(folder_id))
}

fn collect_owned_snippets(
    snippets: &redb::Table<&'static str, &'static [u8]>,
    user_id: &str,
) -> Result<Vec<Snippet>, AppError> {
    let mut owned = Vec::new();
    for item in snippets.iter()? {
        let (_, value) = item?;
        let snippet: Snippet = decode(value.value())?;
        if owned_by(&snippet, user_id) {
            owned.push(snippet);
        }
    }
    Ok(owned)
}

fn write_snippet(
    snippets: &mut redb::Table<&'static str, &'static [u8]>,
    snippet: &Snippet,
) -> Result<(), AppError> {
    let encoded = encode(snippet)?;
    snippets.insert(snippet.id.as_str(), encoded.as_slice())?;
    Ok(())
}

impl TransactionOps {
    /// Persist a new snippet, dropping a folder reference the owner does not
    /// have and registering its tags.
    ///
    /// # Arguments
    /// - `db`: Database handle.
    /// - `snippet`: Snippet to insert; `user_id` must be set.
    ///
    /// # Returns
    /// The snippet as stored.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when the snippet has no owner, or a
    /// storage error when the write fails.
    pub fn create_snippet(db: &Database, mut snippet: Snippet) -> Result<Snippet, AppError> {
        let Some(user_id) = snippet.user_id.clone() else {
            return Err(AppError::BadRequest("Snippet has no owner".to_string()));
        };
        let write_txn = db.db.begin_write()?;
        {
            let folders = write_txn.open_table(FOLDERS)?;
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let mut tags = write_txn.open_table(TAGS)?;

            snippet.folder_id = resolve_folder_in_txn(&folders, &user_id, snippet.folder_id.take())?;
            if snippets.get(snippet.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Snippet id '{}' already exists",
                    snippet.id
                )));
            }
            ensure_tags_in_txn(&mut tags, &user_id, &snippet.tags)?;
            write_snippet(&mut snippets, &snippet)?;
        }
        write_txn.commit()?;
        Ok(snippet)
    }

    /// Build and persist a snippet from a create payload.
    ///
    /// # Errors
    /// Propagates errors from [`Self::create_snippet`].
    pub fn create_from_request(
        db: &Database,
        user_id: &str,
        req: CreateSnippetRequest,
    ) -> Result<Snippet, AppError> {
        Self::create_snippet(db, Snippet::from_create(req, Some(user_id.to_string())))
    }

    /// Apply an update to an owned snippet.
    ///
    /// A `folderId` that does not name one of the owner's folders leaves the
    /// current folder unchanged; an empty one clears it.
    ///
    /// # Returns
    /// `Ok(Some(snippet))` when updated, `Ok(None)` when missing or not owned.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update_snippet(
        db: &Database,
        user_id: &str,
        id: &str,
        update: &UpdateSnippetRequest,
    ) -> Result<Option<Snippet>, AppError> {
        let write_txn = db.db.begin_write()?;
        let updated = {
            let folders = write_txn.open_table(FOLDERS)?;
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let mut tags = write_txn.open_table(TAGS)?;

            let Some(guard) = snippets.get(id)? else {
                return Ok(None);
            };
            let mut snippet: Snippet = decode(guard.value())?;
            drop(guard);
            if !owned_by(&snippet, user_id) {
                return Ok(None);
            }

            let mut update = update.clone();
            if let Some(folder_id) = update.folder_id.take() {
                let trimmed = folder_id.trim();
                if trimmed.is_empty() {
                    update.folder_id = Some(String::new());
                } else if let Some(valid) =
                    resolve_folder_in_txn(&folders, user_id, Some(trimmed.to_string()))?
                {
                    update.folder_id = Some(valid);
                }
            }

            snippet.apply_update(&update);
            ensure_tags_in_txn(&mut tags, user_id, &snippet.tags)?;
            write_snippet(&mut snippets, &snippet)?;
            snippet
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete an owned folder and move its snippets back to unfiled.
    ///
    /// Member snippets are never deleted; only their `folder_id` is cleared.
    ///
    /// # Returns
    /// `Ok(Some(n))` with the number of unfiled snippets, or `Ok(None)` when
    /// the folder is missing or not owned.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn delete_folder(
        db: &Database,
        user_id: &str,
        folder_id: &str,
    ) -> Result<Option<usize>, AppError> {
        let write_txn = db.db.begin_write()?;
        let unfiled = {
            let mut folders = write_txn.open_table(FOLDERS)?;
            let mut snippets = write_txn.open_table(SNIPPETS)?;

            let Some(guard) = folders.get(folder_id)? else {
                return Ok(None);
            };
            let folder: Folder = decode(guard.value())?;
            drop(guard);
            if folder.user_id != user_id {
                return Ok(None);
            }
            folders.remove(folder_id)?;

            let mut members = Vec::new();
            for item in snippets.iter()? {
                let (_, value) = item?;
                let snippet: Snippet = decode(value.value())?;
                if snippet.folder_id.as_deref() == Some(folder_id) {
                    members.push(snippet);
                }
            }
            for mut snippet in members.iter().cloned() {
                snippet.folder_id = None;
                write_snippet(&mut snippets, &snippet)?;
            }
            members.len()
        };
        write_txn.commit()?;
        tracing::info!("deleted folder {} and unfiled {} snippets", folder_id, unfiled);
        Ok(Some(unfiled))
    }

    /// Delete an owned tag row and strip its name from the owner's snippets.
    ///
    /// # Returns
    /// `true` when the tag existed.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn delete_tag(db: &Database, user_id: &str, tag_id: &str) -> Result<bool, AppError> {
        let write_txn = db.db.begin_write()?;
        {
            let mut tags = write_txn.open_table(TAGS)?;
            let mut snippets = write_txn.open_table(SNIPPETS)?;

            let Some(guard) = tags.get(tag_id)? else {
                return Ok(false);
            };
            let tag: Tag = decode(guard.value())?;
            drop(guard);
            if tag.user_id != user_id {
                return Ok(false);
            }
            tags.remove(tag_id)?;

            for mut snippet in collect_owned_snippets(&snippets, user_id)? {
                if snippet.tags.iter().any(|name| name == &tag.name) {
                    snippet.tags.retain(|name| name != &tag.name);
                    write_snippet(&mut snippets, &snippet)?;
                }
            }
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// Remove the owner's tag rows that no snippet references any more.
    ///
    /// # Returns
    /// Number of rows removed.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn cleanup_tags(db: &Database, user_id: &str) -> Result<usize, AppError> {
        let write_txn = db.db.begin_write()?;
        let removed = {
            let mut tags = write_txn.open_table(TAGS)?;
            let snippets = write_txn.open_table(SNIPPETS)?;

            let in_use: std::collections::HashSet<String> = collect_owned_snippets(&snippets, user_id)?
                .into_iter()
                .flat_map(|snippet| snippet.tags)
                .collect();

            let mut orphaned = Vec::new();
            for item in tags.iter()? {
                let (_, value) = item?;
                let tag: Tag = decode(value.value())?;
                if tag.user_id == user_id && !in_use.contains(&tag.name) {
                    orphaned.push(tag.id);
                }
            }
            for id in &orphaned {
                tags.remove(id.as_str())?;
            }
            orphaned.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Import snippets for `user_id` in one transaction.
    ///
    /// Entries that fail validation are skipped and reported; the rest are
    /// stored with fresh ids and timestamps.
    ///
    /// # Arguments
    /// - `db`: Database handle.
    /// - `user_id`: Owner of the imported snippets.
    /// - `items`: Snippets to import.
    /// - `max_code_size`: Largest accepted code body, in bytes.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn import_snippets(
        db: &Database,
        user_id: &str,
        items: Vec<ImportSnippet>,
        max_code_size: usize,
    ) -> Result<ImportResult, AppError> {
        let mut result = ImportResult::default();
        let write_txn = db.db.begin_write()?;
        {
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let mut tags = write_txn.open_table(TAGS)?;

            for (index, item) in items.into_iter().enumerate() {
                let label = item
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("#{}", index + 1));
                let code_len = item.code.as_deref().map_or(0, str::len);
                if code_len > max_code_size {
                    result.skipped += 1;
                    result
                        .errors
                        .push(format!("Error importing '{}': code exceeds {} bytes", label, max_code_size));
                    continue;
                }
                if item.title.as_deref().map_or(0, char_len) > MAX_TITLE_CHARS {
                    result.skipped += 1;
                    result.errors.push(format!(
                        "Error importing '{}': title exceeds {} characters",
                        label, MAX_TITLE_CHARS
                    ));
                    continue;
                }

                let snippet = Snippet::from_create(
                    CreateSnippetRequest {
                        title: item.title,
                        description: item.description,
                        code: item.code,
                        language: item.language,
                        tags: Some(item.tags),
                        folder_id: None,
                        is_favorite: Some(item.is_favorite),
                    },
                    Some(user_id.to_string()),
                );
                ensure_tags_in_txn(&mut tags, user_id, &snippet.tags)?;
                write_snippet(&mut snippets, &snippet)?;
                result.imported += 1;
            }
        }
        write_txn.commit()?;
        tracing::info!(
            "imported {} snippets ({} skipped) for user {}",
            result.imported,
            result.skipped,
            user_id
        );
        Ok(result)
    }
}
