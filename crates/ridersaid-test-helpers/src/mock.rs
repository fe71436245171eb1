//! Mock record store for testing.
//!
//! [`CountingStore`] wraps any [`RecordStore`], counts every call by
//! operation name and can be switched into an outage where every call fails
//! with `StoreUnavailable`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use ridersaid_errors::{Result, StoreError};
use ridersaid_records::{
    AccessToken, Collection, Identity, NewRow, Profile, ProfilePatch, PublicProfile, RecordId,
    Row,
};
use ridersaid_store::{MemoryStore, RecordStore, RowScope, TokenAssignment, TokenWrite};

pub struct CountingStore<S = MemoryStore> {
    inner: S,
    calls: Mutex<BTreeMap<&'static str, usize>>,
    unavailable: AtomicBool,
}

impl CountingStore<MemoryStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: RecordStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(BTreeMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make every following call fail with `StoreUnavailable` (or recover).
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Number of calls to one operation, e.g. `"list_rows"`.
    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// Calls that read or wrote a dependent collection.
    pub fn dependent_calls(&self) -> usize {
        self.calls("list_rows") + self.calls("insert_row") + self.calls("delete_row")
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected outage").into());
        }
        Ok(())
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for CountingStore<S> {
    async fn ensure_profile(
        &self,
        owner: &Identity,
        full_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Profile> {
        self.record("ensure_profile")?;
        self.inner.ensure_profile(owner, full_name, now).await
    }

    async fn profile(&self, owner: &Identity) -> Result<Option<Profile>> {
        self.record("profile")?;
        self.inner.profile(owner).await
    }

    async fn update_profile(
        &self,
        owner: &Identity,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> Result<Profile> {
        self.record("update_profile")?;
        self.inner.update_profile(owner, patch, now).await
    }

    async fn profile_by_token(&self, token: &AccessToken) -> Result<Option<PublicProfile>> {
        self.record("profile_by_token")?;
        self.inner.profile_by_token(token).await
    }

    async fn assign_token(
        &self,
        owner: &Identity,
        candidate: AccessToken,
        mode: TokenWrite,
        now: DateTime<Utc>,
    ) -> Result<TokenAssignment> {
        self.record("assign_token")?;
        self.inner.assign_token(owner, candidate, mode, now).await
    }

    async fn clear_token(&self, owner: &Identity, now: DateTime<Utc>) -> Result<bool> {
        self.record("clear_token")?;
        self.inner.clear_token(owner, now).await
    }

    async fn list_rows(&self, scope: RowScope<'_>, collection: Collection) -> Result<Vec<Row>> {
        self.record("list_rows")?;
        self.inner.list_rows(scope, collection).await
    }

    async fn insert_row(&self, owner: &Identity, row: NewRow) -> Result<Row> {
        self.record("insert_row")?;
        self.inner.insert_row(owner, row).await
    }

    async fn delete_row(
        &self,
        owner: &Identity,
        collection: Collection,
        id: RecordId,
    ) -> Result<bool> {
        self.record("delete_row")?;
        self.inner.delete_row(owner, collection, id).await
    }
}
