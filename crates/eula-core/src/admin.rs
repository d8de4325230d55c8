//! Operator overrides that write consent directly, bypassing the dialogue.

use crate::error::StoreResult;
use crate::store::ConsentStore;
use crate::types::{Authority, UserId, UserPatch, UserRecord};
use tracing::info;

/// Authority level older deployments used to mean "has agreed".
pub const LEGACY_AGREED_AUTHORITY: Authority = 2;

/// Authority legacy records are rewritten to.
pub const REVISED_AUTHORITY: Authority = 1;

#[derive(Clone)]
pub struct Admin {
    store: ConsentStore,
}

impl Admin {
    pub fn new(store: ConsentStore) -> Self {
        Self { store }
    }

    /// Mark the user as having accepted.
    pub async fn grant(&self, user: UserId) -> StoreResult<UserRecord> {
        info!(%user, "Granting agreement by operator override");
        self.store.records().set(user, UserPatch::eula(true)).await
    }

    /// Clear the user's acceptance so the next gated command prompts again.
    pub async fn reset(&self, user: UserId) -> StoreResult<UserRecord> {
        info!(%user, "Resetting agreement by operator override");
        self.store.records().set(user, UserPatch::eula(false)).await
    }

    /// The stored record, or the implicit default.
    pub async fn status(&self, user: UserId) -> StoreResult<UserRecord> {
        self.store.record(user).await
    }

    /// Rewrite legacy authority-encoded consent.
    ///
    /// Every user at [`LEGACY_AGREED_AUTHORITY`] is moved to
    /// [`REVISED_AUTHORITY`] with the explicit flag cleared. Returns the
    /// number of records rewritten.
    pub async fn revise_legacy(&self) -> StoreResult<usize> {
        let records = self.store.records();
        let legacy = records.find_by_authority(LEGACY_AGREED_AUTHORITY).await?;

        let updates = legacy
            .iter()
            .map(|record| {
                (
                    record.id,
                    UserPatch {
                        authority: Some(REVISED_AUTHORITY),
                        eula: Some(false),
                    },
                )
            })
            .collect();

        let revised = records.set_many(updates).await?;
        info!(revised, "Revised legacy agreement records");
        Ok(revised)
    }
}
