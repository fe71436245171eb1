//! Owner repository: typed CRUD scoped to the acting identity.

use std::sync::Arc;

use chrono::Utc;
use ridersaid_errors::{AccessError, Result, RidersAidError};
use ridersaid_records::{
    Allergy, Collection, Condition, DependentRecord, EmergencyContact, Identity, Implant,
    Medication, NewRow, Profile, ProfilePatch, RecordId, Row, Validate,
};
use ridersaid_store::{RecordStore, RowScope};
use tracing::{debug, info, warn};

use crate::aggregate::{AggregationInput, Collections};

pub(crate) fn require_identity(identity: Option<&Identity>) -> Result<&Identity> {
    identity.ok_or_else(|| {
        warn!("Rejected owner operation without identity");
        AccessError::Unauthenticated.into()
    })
}

pub(crate) fn typed_rows<R: DependentRecord>(rows: Vec<Row>) -> Vec<R> {
    rows.into_iter().filter_map(R::from_row).collect()
}

/// The owner's profile with all five collections, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerSnapshot {
    pub profile: Profile,
    pub allergies: Vec<Allergy>,
    pub medications: Vec<Medication>,
    pub conditions: Vec<Condition>,
    pub implants: Vec<Implant>,
    pub contacts: Vec<EmergencyContact>,
}

impl OwnerSnapshot {
    pub fn into_input(self) -> AggregationInput {
        AggregationInput {
            profile: self.profile.public_view(),
            collections: Collections {
                allergies: Some(self.allergies),
                medications: Some(self.medications),
                conditions: Some(self.conditions),
                implants: Some(self.implants),
                contacts: Some(self.contacts),
            },
        }
    }
}

/// Every method takes the acting identity explicitly. `None` fails with
/// `Unauthenticated` before the store is touched, and payloads are validated
/// before any write reaches the store.
#[derive(Clone)]
pub struct OwnerRepository {
    store: Arc<dyn RecordStore>,
}

impl OwnerRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create the profile row on first sign-in. Later calls return the
    /// existing row unchanged.
    pub async fn ensure_profile(
        &self,
        identity: Option<&Identity>,
        full_name: Option<String>,
    ) -> Result<Profile> {
        let identity = require_identity(identity)?;
        let full_name = full_name.filter(|n| !n.trim().is_empty());
        self.store
            .ensure_profile(identity, full_name, Utc::now())
            .await
    }

    pub async fn profile(&self, identity: Option<&Identity>) -> Result<Profile> {
        let identity = require_identity(identity)?;
        self.store
            .profile(identity)
            .await?
            .ok_or_else(|| AccessError::ProfileNotFound.into())
    }

    /// Merge the present fields of `patch` and bump `updated_at`.
    pub async fn update_profile(
        &self,
        identity: Option<&Identity>,
        patch: &ProfilePatch,
    ) -> Result<Profile> {
        let identity = require_identity(identity)?;
        patch.validate()?;
        if patch.is_empty() {
            debug!(profile_id = %identity.id, "Empty profile patch");
        }
        self.store.update_profile(identity, patch, Utc::now()).await
    }

    pub async fn list<R: DependentRecord>(&self, identity: Option<&Identity>) -> Result<Vec<R>> {
        let identity = require_identity(identity)?;
        let rows = self
            .store
            .list_rows(RowScope::Owner(identity), R::COLLECTION)
            .await?;
        Ok(typed_rows(rows))
    }

    /// Add a record owned by `identity`, e.g. `add::<Allergy>(id, new)`.
    pub async fn add<R: DependentRecord>(
        &self,
        identity: Option<&Identity>,
        new: R::New,
    ) -> Result<R> {
        let row = self.add_row(identity, R::wrap_new(new)).await?;
        R::from_row(row).ok_or_else(|| {
            RidersAidError::other(format!("store returned a row outside {}", R::COLLECTION))
        })
    }

    /// Untyped form of [`add`](Self::add), for callers that pick the
    /// collection at runtime.
    pub async fn add_row(&self, identity: Option<&Identity>, row: NewRow) -> Result<Row> {
        let identity = require_identity(identity)?;
        row.validate()?;
        self.store.insert_row(identity, row).await
    }

    pub async fn delete<R: DependentRecord>(
        &self,
        identity: Option<&Identity>,
        id: RecordId,
    ) -> Result<()> {
        self.delete_row(identity, R::COLLECTION, id).await
    }

    /// Delete a record. Records of other owners fail with `NotFound` and
    /// stay untouched.
    pub async fn delete_row(
        &self,
        identity: Option<&Identity>,
        collection: Collection,
        id: RecordId,
    ) -> Result<()> {
        let identity = require_identity(identity)?;
        if self.store.delete_row(identity, collection, id).await? {
            info!(
                profile_id = %identity.id,
                collection = %collection,
                record_id = %id,
                "Record deleted"
            );
            Ok(())
        } else {
            Err(AccessError::record_not_found(collection.as_str(), id.to_string()).into())
        }
    }

    /// Profile plus all five collections, fetched concurrently.
    pub async fn load_snapshot(&self, identity: Option<&Identity>) -> Result<OwnerSnapshot> {
        let profile = self.profile(identity).await?;
        let (allergies, medications, conditions, implants, contacts) = tokio::try_join!(
            self.list::<Allergy>(identity),
            self.list::<Medication>(identity),
            self.list::<Condition>(identity),
            self.list::<Implant>(identity),
            self.list::<EmergencyContact>(identity),
        )?;
        debug!(profile_id = %profile.id, "Loaded owner snapshot");
        Ok(OwnerSnapshot {
            profile,
            allergies,
            medications,
            conditions,
            implants,
            contacts,
        })
    }

    /// Aggregator input for the owner preview.
    pub async fn resolve_by_identity(
        &self,
        identity: Option<&Identity>,
    ) -> Result<AggregationInput> {
        Ok(self.load_snapshot(identity).await?.into_input())
    }
}
