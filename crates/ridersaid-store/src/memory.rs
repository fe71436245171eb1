//! In-memory reference store with optional snapshot persistence.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridersaid_errors::{AccessError, Result};
use ridersaid_records::{
    AccessToken, Collection, Identity, NewRow, Profile, ProfileId, ProfilePatch, PublicProfile,
    RecordId, Row,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::contract::{RecordStore, RowScope, TokenAssignment, TokenWrite};
use crate::storage::FileStorage;

/// Serialized form of every table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub profiles: Vec<Profile>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    profiles: HashMap<ProfileId, Profile>,
    rows: BTreeMap<Collection, Vec<Row>>,
}

impl Tables {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut tables = Tables::default();
        for profile in snapshot.profiles {
            tables.profiles.insert(profile.id.clone(), profile);
        }
        for row in snapshot.rows {
            tables.rows.entry(row.collection()).or_default().push(row);
        }
        tables
    }

    fn to_snapshot(&self) -> Snapshot {
        let mut profiles: Vec<Profile> = self.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        Snapshot {
            profiles,
            rows: self.rows.values().flatten().cloned().collect(),
        }
    }

    fn token_holder(&self, token: &AccessToken) -> Option<&Profile> {
        self.profiles
            .values()
            .find(|p| p.access_token.as_ref() == Some(token))
    }

    fn owned_profile_mut(&mut self, owner: &Identity) -> Result<&mut Profile> {
        self.profiles
            .get_mut(&owner.id)
            .ok_or_else(|| AccessError::ProfileNotFound.into())
    }
}

/// Reference [`RecordStore`].
///
/// All tables sit behind one `RwLock`, so a token uniqueness check and the
/// following assignment can never interleave with another write.
///
/// Writes are staged on a copy of the tables. When a [`FileStorage`] is
/// attached the copy is saved first and only becomes visible once the save
/// succeeded, so a failed or abandoned save leaves memory unchanged.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    storage: Option<FileStorage>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store persisted at `storage`, loading the previous snapshot if
    /// there is one.
    pub async fn with_storage(storage: FileStorage) -> Result<Self> {
        let snapshot: Option<Snapshot> = storage.load().await?;
        let tables = match snapshot {
            Some(snapshot) => {
                info!(
                    path = ?storage.snapshot_path(),
                    profiles = snapshot.profiles.len(),
                    rows = snapshot.rows.len(),
                    "Loaded store snapshot"
                );
                Tables::from_snapshot(snapshot)
            }
            None => Tables::default(),
        };
        Ok(Self {
            tables: RwLock::new(tables),
            storage: Some(storage),
        })
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.tables.read().await.to_snapshot()
    }

    /// Save `staged`, then swap it in as the live tables.
    async fn commit(&self, live: &mut Tables, staged: Tables) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.save(&staged.to_snapshot()).await?;
        }
        *live = staged;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ensure_profile(
        &self,
        owner: &Identity,
        full_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.profiles.get(&owner.id) {
            return Ok(existing.clone());
        }

        let profile = Profile::new(owner.id.clone(), full_name, now);
        let mut staged = tables.clone();
        staged.profiles.insert(owner.id.clone(), profile.clone());
        self.commit(&mut tables, staged).await?;

        info!(profile_id = %owner.id, "Created profile");
        Ok(profile)
    }

    async fn profile(&self, owner: &Identity) -> Result<Option<Profile>> {
        debug!(profile_id = %owner.id, "Loading owner profile");
        Ok(self.tables.read().await.profiles.get(&owner.id).cloned())
    }

    async fn update_profile(
        &self,
        owner: &Identity,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let profile = staged.owned_profile_mut(owner)?;
        patch.apply(profile);
        profile.updated_at = now;
        let updated = profile.clone();
        self.commit(&mut tables, staged).await?;

        info!(profile_id = %owner.id, "Updated profile");
        Ok(updated)
    }

    async fn profile_by_token(&self, token: &AccessToken) -> Result<Option<PublicProfile>> {
        let tables = self.tables.read().await;
        Ok(tables.token_holder(token).map(Profile::public_view))
    }

    async fn assign_token(
        &self,
        owner: &Identity,
        candidate: AccessToken,
        mode: TokenWrite,
        now: DateTime<Utc>,
    ) -> Result<TokenAssignment> {
        let mut tables = self.tables.write().await;

        let current = tables
            .profiles
            .get(&owner.id)
            .ok_or(AccessError::ProfileNotFound)?
            .access_token
            .clone();
        if let (TokenWrite::IfUnset, Some(existing)) = (mode, current) {
            debug!(profile_id = %owner.id, "Profile already has an access token");
            return Ok(TokenAssignment::Existing(existing));
        }

        if tables.token_holder(&candidate).is_some() {
            warn!(profile_id = %owner.id, "Generated access token collides with a stored one");
            return Ok(TokenAssignment::Collision);
        }

        let mut staged = tables.clone();
        let profile = staged.owned_profile_mut(owner)?;
        profile.access_token = Some(candidate.clone());
        profile.updated_at = now;
        self.commit(&mut tables, staged).await?;

        info!(profile_id = %owner.id, "Assigned access token");
        Ok(TokenAssignment::Assigned(candidate))
    }

    async fn clear_token(&self, owner: &Identity, now: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let profile = staged.owned_profile_mut(owner)?;
        if profile.access_token.take().is_none() {
            return Ok(false);
        }
        profile.updated_at = now;
        self.commit(&mut tables, staged).await?;

        info!(profile_id = %owner.id, "Cleared access token");
        Ok(true)
    }

    async fn list_rows(&self, scope: RowScope<'_>, collection: Collection) -> Result<Vec<Row>> {
        let profile_id = scope.profile_id();
        debug!(profile_id = %profile_id, collection = %collection, "Listing rows");

        let tables = self.tables.read().await;
        Ok(tables
            .rows
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.profile_id() == profile_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_row(&self, owner: &Identity, row: NewRow) -> Result<Row> {
        let collection = row.collection();
        let row = row.into_row(RecordId::generate(), owner.id.clone());

        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&owner.id) {
            return Err(AccessError::ProfileNotFound.into());
        }
        let mut staged = tables.clone();
        staged.rows.entry(collection).or_default().push(row.clone());
        self.commit(&mut tables, staged).await?;

        info!(
            profile_id = %owner.id,
            collection = %collection,
            record_id = %row.id(),
            "Inserted row"
        );
        Ok(row)
    }

    async fn delete_row(
        &self,
        owner: &Identity,
        collection: Collection,
        id: RecordId,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let Some(rows) = staged.rows.get_mut(&collection) else {
            return Ok(false);
        };

        let before = rows.len();
        rows.retain(|row| !(row.id() == id && owner.owns(row.profile_id())));
        if rows.len() == before {
            warn!(
                profile_id = %owner.id,
                collection = %collection,
                record_id = %id,
                "Delete matched no owned row"
            );
            return Ok(false);
        }
        self.commit(&mut tables, staged).await?;

        info!(
            profile_id = %owner.id,
            collection = %collection,
            record_id = %id,
            "Deleted row"
        );
        Ok(true)
    }
}
