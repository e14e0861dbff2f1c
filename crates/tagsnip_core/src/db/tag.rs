//! Tag storage operations backed by redb.

use super::tables::{SNIPPETS, TAGS};
use super::{decode, encode};
use crate::error::AppError;
use crate::models::snippet::Snippet;
use crate::models::tag::{Tag, TagSummary};
use redb::{ReadableDatabase, ReadableTable};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Accessor for the `tags` table.
pub struct TagDb {
    db: Arc<redb::Database>,
}

pub(crate) fn find_by_name(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    user_id: &str,
    name: &str,
) -> Result<Option<Tag>, AppError> {
    for item in table.iter()? {
        let (_, value) = item?;
        let tag: Tag = decode(value.value())?;
        if tag.user_id == user_id && tag.name == name {
            return Ok(Some(tag));
        }
    }
    Ok(None)
}

/// Make sure a tag row exists for every name in `names`.
pub(crate) fn ensure_tags_in_txn(
    table: &mut redb::Table<&'static str, &'static [u8]>,
    user_id: &str,
    names: &[String],
) -> Result<(), AppError> {
    for name in names {
        if find_by_name(&*table, user_id, name)?.is_some() {
            continue;
        }
        let tag = Tag::new(name.clone(), user_id.to_string());
        let encoded = encode(&tag)?;
        table.insert(tag.id.as_str(), encoded.as_slice())?;
    }
    Ok(())
}

impl TagDb {
    /// Initialize the tag table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(TAGS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Create a tag from an already-normalized name.
    ///
    /// # Errors
    /// Returns [`AppError::Conflict`] when the user already has that tag.
    pub fn create(&self, user_id: &str, name: &str) -> Result<Tag, AppError> {
        let write_txn = self.db.begin_write()?;
        let tag = {
            let mut table = write_txn.open_table(TAGS)?;
            if find_by_name(&table, user_id, name)?.is_some() {
                return Err(AppError::Conflict(format!("Tag '{}' already exists", name)));
            }
            let tag = Tag::new(name.to_string(), user_id.to_string());
            let encoded = encode(&tag)?;
            table.insert(tag.id.as_str(), encoded.as_slice())?;
            tag
        };
        write_txn.commit()?;
        Ok(tag)
    }

    /// Fetch an owned tag row by id.
    ///
    /// # Errors
    /// Returns an error if the lookup fails.
    pub fn get_owned(&self, user_id: &str, id: &str) -> Result<Option<Tag>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TAGS)?;
        let Some(guard) = table.get(id)? else {
            return Ok(None);
        };
        let tag: Tag = decode(guard.value())?;
        Ok((tag.user_id == user_id).then_some(tag))
    }

    /// Tags referenced by the user's snippets with their usage counts,
    /// sorted by name. Rows with no referencing snippet are omitted.
    ///
    /// # Errors
    /// Returns an error if iteration or deserialization fails.
    pub fn list_with_counts(&self, user_id: &str) -> Result<Vec<TagSummary>, AppError> {
        let read_txn = self.db.begin_read()?;
        let tags_table = read_txn.open_table(TAGS)?;
        let snippets_table = read_txn.open_table(SNIPPETS)?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for item in snippets_table.iter()? {
            let (_, value) = item?;
            let snippet: Snippet = decode(value.value())?;
            if snippet.user_id.as_deref() != Some(user_id) {
                continue;
            }
            for tag in snippet.tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        let mut ids: BTreeMap<String, String> = BTreeMap::new();
        for item in tags_table.iter()? {
            let (_, value) = item?;
            let tag: Tag = decode(value.value())?;
            if tag.user_id == user_id {
                ids.insert(tag.name, tag.id);
            }
        }

        Ok(counts
            .into_iter()
            .map(|(name, snippet_count)| TagSummary {
                id: ids.get(&name).cloned().unwrap_or_else(|| name.clone()),
                name,
                snippet_count,
            })
            .collect())
    }
}
