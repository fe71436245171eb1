//! Shared handler state.

use std::sync::Arc;

use chrono::Duration;
use ridersaid_emergency::{OwnerRepository, PublicResolver, TokenLifecycle};
use ridersaid_errors::Result;
use ridersaid_store::{FileStorage, MemoryStore, RecordStore};
use tracing::info;

use crate::config::ServiceConfig;
use crate::identity::{IdentityProvider, MemoryIdentityProvider};

#[derive(Clone)]
pub struct AppState {
    pub owner: OwnerRepository,
    pub public: PublicResolver,
    pub tokens: TokenLifecycle,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        config: ServiceConfig,
    ) -> Self {
        let tokens =
            TokenLifecycle::new(store.clone()).with_max_attempts(config.tokens.max_attempts);
        Self {
            owner: OwnerRepository::new(store.clone()),
            public: PublicResolver::new(store),
            tokens,
            identity,
            config: Arc::new(config),
        }
    }

    /// Open the record store and account directory described by `config`.
    ///
    /// With a snapshot path both are persisted: records in the snapshot,
    /// accounts in `<snapshot>.accounts.json` next to it, so a restart keeps
    /// every profile reachable by its owner.
    pub async fn from_config(config: ServiceConfig) -> Result<Self> {
        let (store, identity): (Arc<dyn RecordStore>, MemoryIdentityProvider) =
            match &config.store.snapshot_path {
                Some(path) => {
                    let storage = FileStorage::new(path).await?;
                    let accounts = storage.companion("accounts").await?;
                    info!(path = ?path, "Opening record store snapshot");
                    (
                        Arc::new(MemoryStore::with_storage(storage).await?),
                        MemoryIdentityProvider::with_storage(accounts).await?,
                    )
                }
                None => (Arc::new(MemoryStore::new()), MemoryIdentityProvider::new()),
            };

        let identity = identity
            .with_kdf_rounds(config.identity.kdf_rounds)
            .with_session_ttl(Duration::hours(i64::from(config.identity.session_ttl_hours)));
        Ok(Self::new(store, Arc::new(identity), config))
    }

    /// Replace the token lifecycle, e.g. with a deterministic token source.
    pub fn with_tokens(mut self, tokens: TokenLifecycle) -> Self {
        self.tokens = tokens;
        self
    }
}
