//! Per-user tab-state storage.

use super::tables::TABS;
use super::{decode, encode};
use crate::error::AppError;
use crate::models::tab::TabsState;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the `tabs` table.
pub struct TabDb {
    db: Arc<redb::Database>,
}

impl TabDb {
    /// Initialize the tab table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(TABS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// The user's saved tabs sorted by `order`; empty when never saved.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, user_id: &str) -> Result<TabsState, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABS)?;
        let mut state: TabsState = match table.get(user_id)? {
            Some(value) => decode(value.value())?,
            None => TabsState::default(),
        };
        state.tabs.sort_by_key(|tab| tab.order);
        Ok(state)
    }

    /// Replace the user's tab list.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when more than one entry is active.
    pub fn put(&self, user_id: &str, state: &TabsState) -> Result<(), AppError> {
        if state.active_count() > 1 {
            return Err(AppError::BadRequest(
                "At most one tab may be active".to_string(),
            ));
        }
        let encoded = encode(state)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABS)?;
            table.insert(user_id, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
