//! Per-user consent storage.
//!
//! The gate never owns user data. [`RecordStore`] is the contract the host's
//! user database must satisfy; [`ConsentStore`] is the thin consent-specific
//! view the dialogue and interceptor use on top of it.

use crate::error::StoreResult;
use crate::types::{Authority, UserId, UserPatch, UserRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Keyed user record storage provided by the host.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a user record, `None` if the user has never been stored.
    async fn get(&self, user: UserId) -> StoreResult<Option<UserRecord>>;

    /// Apply a patch, creating the record with defaults if absent.
    async fn set(&self, user: UserId, patch: UserPatch) -> StoreResult<UserRecord>;

    /// All users with exactly the given authority.
    async fn find_by_authority(&self, authority: Authority) -> StoreResult<Vec<UserRecord>>;

    /// Apply several patches. Backends with transactions should override this
    /// so the batch is atomic.
    async fn set_many(&self, updates: Vec<(UserId, UserPatch)>) -> StoreResult<usize> {
        let count = updates.len();
        for (user, patch) in updates {
            self.set(user, patch).await?;
        }
        Ok(count)
    }
}

/// In-memory [`RecordStore`], for tests and the console host.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    users: DashMap<UserId, UserRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly.
    pub fn insert(&self, record: UserRecord) {
        self.users.insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, user: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(&user).map(|r| r.clone()))
    }

    async fn set(&self, user: UserId, patch: UserPatch) -> StoreResult<UserRecord> {
        let mut entry = self
            .users
            .entry(user)
            .or_insert_with(|| UserRecord::new(user));
        patch.apply(&mut entry);
        Ok(entry.clone())
    }

    async fn find_by_authority(&self, authority: Authority) -> StoreResult<Vec<UserRecord>> {
        let mut found: Vec<UserRecord> = self
            .users
            .iter()
            .filter(|r| r.authority == authority)
            .map(|r| r.clone())
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }
}

/// A user's agreement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub user: UserId,
    pub accepted: bool,
}

/// Consent view over a [`RecordStore`].
///
/// Holds no copy of any record; every read goes to the backing store.
#[derive(Clone)]
pub struct ConsentStore {
    records: Arc<dyn RecordStore>,
}

impl ConsentStore {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// The full user record, or the implicit default for unseen users.
    pub async fn record(&self, user: UserId) -> StoreResult<UserRecord> {
        Ok(self
            .records
            .get(user)
            .await?
            .unwrap_or_else(|| UserRecord::new(user)))
    }

    /// Consent status; an absent record counts as not accepted.
    pub async fn consent(&self, user: UserId) -> StoreResult<ConsentRecord> {
        let record = self.record(user).await?;
        Ok(ConsentRecord {
            user,
            accepted: record.eula,
        })
    }

    pub async fn is_accepted(&self, user: UserId) -> StoreResult<bool> {
        Ok(self.consent(user).await?.accepted)
    }

    /// Write the consent flag. Used by the dialogue and by administrative
    /// overrides.
    pub async fn set_accepted(&self, user: UserId, accepted: bool) -> StoreResult<()> {
        debug!(%user, accepted, "Writing consent flag");
        self.records.set(user, UserPatch::eula(accepted)).await?;
        Ok(())
    }

    /// The backing store.
    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Arc<MemoryRecordStore>, ConsentStore) {
        let memory = Arc::new(MemoryRecordStore::new());
        let consent = ConsentStore::new(memory.clone());
        (memory, consent)
    }

    #[tokio::test]
    async fn test_absent_record_is_not_accepted() {
        let (memory, consent) = store();

        assert!(!consent.is_accepted(UserId(1)).await.unwrap());
        // Reading never creates a record
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_set_accepted_creates_record() {
        let (memory, consent) = store();

        consent.set_accepted(UserId(1), true).await.unwrap();

        assert!(consent.is_accepted(UserId(1)).await.unwrap());
        assert_eq!(memory.len(), 1);
        let record = consent.record(UserId(1)).await.unwrap();
        assert_eq!(record.authority, crate::types::DEFAULT_AUTHORITY);
    }

    #[tokio::test]
    async fn test_set_accepted_keeps_authority() {
        let (memory, consent) = store();
        memory.insert(UserRecord::new(UserId(9)).with_authority(4));

        consent.set_accepted(UserId(9), true).await.unwrap();

        let record = consent.record(UserId(9)).await.unwrap();
        assert_eq!(record.authority, 4);
        assert!(record.eula);
    }

    #[tokio::test]
    async fn test_rejection_overwrites_acceptance() {
        let (_, consent) = store();

        consent.set_accepted(UserId(2), true).await.unwrap();
        consent.set_accepted(UserId(2), false).await.unwrap();

        assert_eq!(
            consent.consent(UserId(2)).await.unwrap(),
            ConsentRecord {
                user: UserId(2),
                accepted: false
            }
        );
    }

    #[tokio::test]
    async fn test_find_by_authority() {
        let (memory, _) = store();
        memory.insert(UserRecord::new(UserId(3)).with_authority(2));
        memory.insert(UserRecord::new(UserId(1)).with_authority(2));
        memory.insert(UserRecord::new(UserId(2)).with_authority(1));

        let found = memory.find_by_authority(2).await.unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![UserId(1), UserId(3)]);
    }

    #[tokio::test]
    async fn test_set_many_default_impl() {
        let (memory, _) = store();

        let count = memory
            .set_many(vec![
                (UserId(1), UserPatch::eula(true)),
                (UserId(2), UserPatch::authority(3)),
            ])
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert!(memory.get(UserId(1)).await.unwrap().unwrap().eula);
        assert_eq!(memory.get(UserId(2)).await.unwrap().unwrap().authority, 3);
    }
}
