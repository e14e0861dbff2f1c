//! Database layer and transactional helpers for tagsnip.

/// Folder storage helpers.
pub mod folder;
/// Snippet storage helpers.
pub mod snippet;
/// Tab-state storage helpers.
pub mod tab;
/// redb table definitions.
pub mod tables;
/// Tag storage helpers.
pub mod tag;
/// Cross-table atomic operations.
pub mod transactions;
/// User storage helpers.
pub mod user;

pub use transactions::TransactionOps;

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to the per-entity accessors.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub snippets: snippet::SnippetDb,
    pub folders: folder::FolderDb,
    pub tags: tag::TagDb,
    pub tabs: tab::TabDb,
    pub users: user::UserDb,
}

#[cfg(test)]
mod tests;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, AppError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

impl Database {
    /// Open (or create) the database under the directory `path`.
    ///
    /// # Arguments
    /// - `path`: Directory that holds the redb file.
    ///
    /// # Returns
    /// A [`Database`] with every table initialized.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the redb file
    /// cannot be opened (for example because another process holds it), or
    /// table initialization fails.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(tables::REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => db,
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database '{}' is already open in another tagsnip process",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        tracing::debug!("opened database at {}", file.display());
        Self::from_shared(Arc::new(db))
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            snippets: snippet::SnippetDb::new(db.clone())?,
            folders: folder::FolderDb::new(db.clone())?,
            tags: tag::TagDb::new(db.clone())?,
            tabs: tab::TabDb::new(db.clone())?,
            users: user::UserDb::new(db.clone())?,
            db,
        })
    }
}
