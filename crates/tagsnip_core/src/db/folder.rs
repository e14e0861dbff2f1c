//! Folder storage operations backed by redb.

use super::tables::{FOLDERS, SNIPPETS};
use super::{decode, encode};
use crate::error::AppError;
use crate::models::folder::{Folder, FolderSummary, UpdateFolderRequest};
use crate::models::snippet::Snippet;
use redb::{ReadableDatabase, ReadableTable};
use std::collections::HashMap;
use std::sync::Arc;

/// Accessor for the `folders` table.
pub struct FolderDb {
    db: Arc<redb::Database>,
}

impl FolderDb {
    /// Initialize the folder table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(FOLDERS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new folder.
    ///
    /// # Errors
    /// Returns an error if serialization or insertion fails.
    pub fn create(&self, folder: &Folder) -> Result<(), AppError> {
        let encoded = encode(folder)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FOLDERS)?;
            table.insert(folder.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a folder by id if `user_id` owns it.
    ///
    /// # Errors
    /// Returns an error if the lookup fails.
    pub fn get_owned(&self, user_id: &str, id: &str) -> Result<Option<Folder>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FOLDERS)?;
        let Some(guard) = table.get(id)? else {
            return Ok(None);
        };
        let folder: Folder = decode(guard.value())?;
        Ok((folder.user_id == user_id).then_some(folder))
    }

    /// Apply a name/color update to an owned folder.
    ///
    /// # Arguments
    /// - `user_id`: Owner.
    /// - `id`: Folder identifier.
    /// - `update`: Fields to change; `name` must already be validated.
    ///
    /// # Returns
    /// Updated folder if it exists and is owned by `user_id`.
    ///
    /// # Errors
    /// Returns an error if serialization or update fails.
    pub fn update(
        &self,
        user_id: &str,
        id: &str,
        update: &UpdateFolderRequest,
    ) -> Result<Option<Folder>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(FOLDERS)?;
            let Some(guard) = table.get(id)? else {
                return Ok(None);
            };
            let mut folder: Folder = decode(guard.value())?;
            drop(guard);
            if folder.user_id != user_id {
                return Ok(None);
            }
            if let Some(name) = &update.name {
                folder.name = name.clone();
            }
            if let Some(color) = update.color {
                folder.color = color;
            }
            let encoded = encode(&folder)?;
            table.insert(id, encoded.as_slice())?;
            folder
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// List a user's folders sorted by name, each with its snippet count.
    ///
    /// Counts are derived from snippet rows in the same read transaction, so
    /// they cannot drift from the snippets they describe.
    ///
    /// # Errors
    /// Returns an error if iteration or deserialization fails.
    pub fn list_with_counts(&self, user_id: &str) -> Result<Vec<FolderSummary>, AppError> {
        let read_txn = self.db.begin_read()?;
        let folders_table = read_txn.open_table(FOLDERS)?;
        let snippets_table = read_txn.open_table(SNIPPETS)?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for item in snippets_table.iter()? {
            let (_, value) = item?;
            let snippet: Snippet = decode(value.value())?;
            if let Some(folder_id) = snippet.folder_id {
                *counts.entry(folder_id).or_insert(0) += 1;
            }
        }

        let mut folders = Vec::new();
        for item in folders_table.iter()? {
            let (_, value) = item?;
            let folder: Folder = decode(value.value())?;
            if folder.user_id == user_id {
                let count = counts.get(&folder.id).copied().unwrap_or(0);
                folders.push(folder.summarize(count));
            }
        }
        folders.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(folders)
    }

    /// Summary (with count) of one owned folder.
    ///
    /// # Errors
    /// Returns an error if iteration or deserialization fails.
    pub fn summary(&self, user_id: &str, id: &str) -> Result<Option<FolderSummary>, AppError> {
        Ok(self
            .list_with_counts(user_id)?
            .into_iter()
            .find(|folder| folder.id == id))
    }
}
