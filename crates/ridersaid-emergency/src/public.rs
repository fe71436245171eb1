//! Public resolver: access token to read-only emergency data.
//!
//! Possession of a valid token grants read access to the whole emergency
//! view of one profile. Nothing else is checked. The only way to reach the
//! dependent collections on this path is a [`TokenGrant`], and a grant only
//! exists after the token matched a stored profile, so an unknown token never
//! causes a dependent read.

use std::sync::Arc;

use ridersaid_errors::{AccessError, Result, ResultExt};
use ridersaid_records::{
    AccessToken, Allergy, Condition, DependentRecord, EmergencyContact, Implant, Medication,
    ProfileId, PublicProfile,
};
use ridersaid_store::{RecordStore, RowScope};
use tracing::{debug, warn};

use crate::aggregate::{AggregationInput, Collections};
use crate::owner::typed_rows;

/// Proof that a token resolved to a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    profile: PublicProfile,
}

impl TokenGrant {
    pub fn profile_id(&self) -> &ProfileId {
        &self.profile.id
    }

    pub fn profile(&self) -> &PublicProfile {
        &self.profile
    }

    pub fn into_profile(self) -> PublicProfile {
        self.profile
    }
}

#[derive(Clone)]
pub struct PublicResolver {
    store: Arc<dyn RecordStore>,
}

impl PublicResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Exact-match lookup of `token`. Unknown and empty tokens are
    /// `NotFound`; empty ones never reach the store.
    pub async fn resolve(&self, token: &str) -> Result<TokenGrant> {
        let Some(token) = AccessToken::new(token) else {
            debug!("Empty access token");
            return Err(AccessError::ProfileNotFound.into());
        };

        let found = self
            .store
            .profile_by_token(&token)
            .await
            .with_context("resolve_access_token")?;
        match found {
            Some(profile) => {
                debug!(profile_id = %profile.id, "Access token resolved");
                Ok(TokenGrant { profile })
            }
            None => {
                warn!("Unknown access token");
                Err(AccessError::ProfileNotFound.into())
            }
        }
    }

    /// Dependent rows of the granted profile.
    pub async fn list<R: DependentRecord>(&self, grant: &TokenGrant) -> Result<Vec<R>> {
        let rows = self
            .store
            .list_rows(RowScope::Public(grant.profile_id()), R::COLLECTION)
            .await?;
        Ok(typed_rows(rows))
    }

    /// All five collections of the granted profile, fetched concurrently.
    pub async fn collections(&self, grant: &TokenGrant) -> Result<Collections> {
        let (allergies, medications, conditions, implants, contacts) = tokio::try_join!(
            self.list::<Allergy>(grant),
            self.list::<Medication>(grant),
            self.list::<Condition>(grant),
            self.list::<Implant>(grant),
            self.list::<EmergencyContact>(grant),
        )?;
        Ok(Collections {
            allergies: Some(allergies),
            medications: Some(medications),
            conditions: Some(conditions),
            implants: Some(implants),
            contacts: Some(contacts),
        })
    }

    /// Aggregator input for the public view.
    pub async fn resolve_by_token(&self, token: &str) -> Result<AggregationInput> {
        let grant = self.resolve(token).await?;
        let collections = self.collections(&grant).await?;
        Ok(AggregationInput {
            profile: grant.into_profile(),
            collections,
        })
    }
}
