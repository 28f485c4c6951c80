//! Credential store interface and the in-memory implementation
//!
//! The Auth Service only sees `dyn CredentialStore`; which backend sits
//! behind it is decided once at startup.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CredentialRecord, NewCredential};

/// Which unique field an insert collided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's own uniqueness enforcement rejected an insert.
    #[error("Unique constraint violated on {0:?}")]
    Conflict(UniqueField),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Document collection of credential records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str)
        -> Result<Option<CredentialRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Returns `Ok(None)` both for a miss and for an id this store could
    /// never have issued.
    async fn find_by_id(&self, id: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Persist a new record, assigning its id.
    async fn insert(&self, new: NewCredential) -> Result<CredentialRecord, StoreError>;
}

#[derive(Default)]
struct MemoryState {
    records: HashMap<u64, CredentialRecord>,
    next_id: u64,
}

/// Mutex-guarded map with a monotonic id counter.
///
/// Uniqueness is re-checked under the lock, so concurrent inserts of the
/// same username cannot both succeed.
#[derive(Default)]
pub struct MemoryCredentialStore {
    state: Mutex<MemoryState>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("credential store lock poisoned".to_string()))
    }

    fn find_by<F>(&self, pred: F) -> Result<Option<CredentialRecord>, StoreError>
    where
        F: Fn(&CredentialRecord) -> bool,
    {
        let state = self.lock()?;
        Ok(state.records.values().find(|r| pred(r)).cloned())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        self.find_by(|r| r.username == username)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.find_by(|r| r.email == email)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let Ok(key) = id.parse::<u64>() else {
            return Ok(None);
        };
        let state = self.lock()?;
        Ok(state.records.get(&key).cloned())
    }

    async fn insert(&self, new: NewCredential) -> Result<CredentialRecord, StoreError> {
        let mut state = self.lock()?;

        if state.records.values().any(|r| r.username == new.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        if state.records.values().any(|r| r.email == new.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }

        state.next_id += 1;
        let id = state.next_id;
        let record = new.into_record(id.to_string());
        state.records.insert(id, record.clone());

        Ok(record)
    }
}
