//! In-memory `UserStore`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{InsertOutcome, StoreError, UserRecord, UserStore};

/// Process-local user store.
///
/// # Thread Safety
///
/// Lookups take the read lock; inserts take the write lock for the whole
/// check-and-insert, which is what makes `insert_if_absent` atomic.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(users.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_if_absent(&self, record: UserRecord) -> Result<InsertOutcome, StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::LockPoisoned)?;
        match users.entry(record.username.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(InsertOutcome::Created)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(users.get(username).cloned())
    }
}
