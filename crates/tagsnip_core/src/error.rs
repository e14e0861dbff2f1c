//! Storage and domain errors shared by the server and the core stores.

use std::fmt;
use thiserror::Error;

/// Kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Snippet,
    Folder,
    Tag,
    User,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Snippet => "Snippet",
            Entity::Folder => "Folder",
            Entity::Tag => "Tag",
            Entity::User => "User",
        })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    /// Storage failure that has no redb error to carry (e.g. directory setup).
    #[error("storage error: {0}")]
    StorageMessage(String),

    #[error("row encoding error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected failure; the context is logged, never sent to clients.
    #[error("internal error: {0}")]
    Internal(String),
}

// Every redb error family funnels into `redb::Error`.
macro_rules! from_redb {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(value: $source) -> Self {
                    Self::Database(value.into())
                }
            }
        )+
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(AppError::NotFound(Entity::Snippet).to_string(), "Snippet not found");
        assert_eq!(AppError::NotFound(Entity::Folder).to_string(), "Folder not found");
    }

    #[test]
    fn redb_storage_errors_convert() {
        let err: AppError = redb::StorageError::Corrupted("bad page".into()).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
