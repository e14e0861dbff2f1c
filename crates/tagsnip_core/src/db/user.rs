//! User account storage.

use super::tables::{USERNAMES, USERS};
use super::{decode, encode};
use crate::error::AppError;
use crate::models::user::User;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the `users` and `usernames` tables.
pub struct UserDb {
    db: Arc<redb::Database>,
}

impl UserDb {
    /// Initialize user tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(USERS)?;
        write_txn.open_table(USERNAMES)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a user and its username index entry atomically.
    ///
    /// # Errors
    /// Returns [`AppError::Conflict`] when the username is taken.
    pub fn create(&self, user: &User) -> Result<(), AppError> {
        let encoded = encode(user)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut names = write_txn.open_table(USERNAMES)?;
            if names.get(user.username.as_str())?.is_some() {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
            names.insert(user.username.as_str(), user.id.as_str())?;
            users.insert(user.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a user by (already-normalized) username.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let names = read_txn.open_table(USERNAMES)?;
        let Some(id) = names.get(username)? else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        let user = match users.get(id.value())? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(user)
    }
}
