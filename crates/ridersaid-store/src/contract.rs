//! The record store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridersaid_errors::Result;
use ridersaid_records::{
    AccessToken, Collection, Identity, NewRow, Profile, ProfileId, ProfilePatch, PublicProfile,
    RecordId, Row,
};

/// Whose rows a dependent read may see.
#[derive(Debug, Clone, Copy)]
pub enum RowScope<'a> {
    /// Rows owned by the acting identity.
    Owner(&'a Identity),
    /// All rows of a profile whose token has already been resolved.
    Public(&'a ProfileId),
}

impl RowScope<'_> {
    pub fn profile_id(&self) -> &ProfileId {
        match self {
            RowScope::Owner(identity) => &identity.id,
            RowScope::Public(id) => id,
        }
    }
}

/// How a token write treats an existing token on the owner's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenWrite {
    /// Keep an existing token and report it back.
    IfUnset,
    /// Replace whatever is there.
    Replace,
}

/// Outcome of a token write, decided under a single write lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAssignment {
    /// The candidate is now the profile's token.
    Assigned(AccessToken),
    /// The profile already had this token and `IfUnset` kept it.
    Existing(AccessToken),
    /// Another profile holds the candidate. Nothing was written.
    Collision,
}

/// Row-scoped storage of profiles and their dependent collections.
///
/// Every method is a single atomic store operation. Dropping the returned
/// future before completion leaves no partial write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the owner's profile row unless it exists. Returns the stored row.
    async fn ensure_profile(
        &self,
        owner: &Identity,
        full_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Profile>;

    /// The owner's own profile row, token included.
    async fn profile(&self, owner: &Identity) -> Result<Option<Profile>>;

    /// Merge `patch` into the owner's profile and stamp `updated_at = now`.
    async fn update_profile(
        &self,
        owner: &Identity,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> Result<Profile>;

    /// Public projection of the profile holding exactly this token.
    async fn profile_by_token(&self, token: &AccessToken) -> Result<Option<PublicProfile>>;

    /// Write `candidate` as the owner's token unless another profile has it.
    async fn assign_token(
        &self,
        owner: &Identity,
        candidate: AccessToken,
        mode: TokenWrite,
        now: DateTime<Utc>,
    ) -> Result<TokenAssignment>;

    /// Remove the owner's token. Returns whether one was set.
    async fn clear_token(&self, owner: &Identity, now: DateTime<Utc>) -> Result<bool>;

    /// Dependent rows of one collection, oldest first.
    async fn list_rows(&self, scope: RowScope<'_>, collection: Collection) -> Result<Vec<Row>>;

    /// Insert a row owned by `owner`. Fails with `NotFound` when the owner
    /// has no profile row.
    async fn insert_row(&self, owner: &Identity, row: NewRow) -> Result<Row>;

    /// Delete a row if `owner` owns it. Rows of other profiles are
    /// indistinguishable from missing ones.
    async fn delete_row(&self, owner: &Identity, collection: Collection, id: RecordId)
    -> Result<bool>;
}
