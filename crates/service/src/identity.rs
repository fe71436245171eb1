//! Identity provider: accounts, sign-in and bearer sessions.
//!
//! The rest of the service only ever sees the [`Identity`] a session token
//! resolves to. Which user is acting is never inferred from request bodies.
//!
//! [`MemoryIdentityProvider`] keeps accounts in process and, when given a
//! [`FileStorage`], in a JSON file next to the record snapshot. Sessions are
//! never persisted: a restart signs everybody out but keeps their accounts.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use ridersaid_errors::{AccessError, Result, RidersAidError};
use ridersaid_records::{Identity, ProfileId, validate_credentials, validate_registration};
use ridersaid_store::FileStorage;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

const SALT_BYTES: usize = 16;
const DIGEST_BYTES: usize = 32;

/// PBKDF2-HMAC-SHA256 rounds for new password digests.
pub const DEFAULT_KDF_ROUNDS: u32 = 100_000;

/// How long a session stays valid after sign-in.
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 168;

/// A signed-in session. The token goes into `Authorization: Bearer …`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub profile_id: ProfileId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn identity(&self) -> Identity {
        Identity::new(self.profile_id.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("profile_id", &self.profile_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Source of the current identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn register(&self, email: &str, password: &str, full_name: &str) -> Result<Session>;

    /// Sign in with email and password.
    async fn login(&self, email: &str, password: &str) -> Result<Session>;

    /// End a session. Returns whether the token was live.
    async fn logout(&self, session_token: &str) -> Result<bool>;

    /// The identity behind a live session token, if any.
    async fn identify(&self, session_token: &str) -> Result<Option<Identity>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    profile_id: ProfileId,
    salt: String,
    rounds: u32,
    digest: String,
}

impl Account {
    fn matches(&self, digest: &str) -> bool {
        self.digest.as_bytes().ct_eq(digest.as_bytes()).into()
    }
}

/// Accounts are keyed by normalized email.
type Accounts = BTreeMap<String, Account>;

fn derive(salt: &str, password: &str, rounds: u32) -> String {
    let mut out = [0u8; DIGEST_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), rounds, &mut out);
    hex::encode(out)
}

/// Run the key derivation on the blocking pool.
async fn derive_blocking(salt: String, password: String, rounds: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || derive(&salt, &password, rounds))
        .await
        .map_err(|e| RidersAidError::other(format!("password digest task failed: {e}")))
}

fn new_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct LiveSession {
    profile_id: ProfileId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Directory {
    accounts: Accounts,
    sessions: HashMap<String, LiveSession>,
}

impl Directory {
    /// Opening a session also drops every expired one.
    fn open_session(&mut self, profile_id: &ProfileId, ttl: Duration) -> Session {
        let now = Utc::now();
        self.sessions.retain(|_, s| s.expires_at > now);

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = now + ttl;
        self.sessions.insert(
            token.clone(),
            LiveSession {
                profile_id: profile_id.clone(),
                expires_at,
            },
        );
        Session {
            token,
            profile_id: profile_id.clone(),
            expires_at,
        }
    }
}

/// Accounts with salted PBKDF2-HMAC-SHA256 password digests, compared in
/// constant time.
#[derive(Debug)]
pub struct MemoryIdentityProvider {
    directory: RwLock<Directory>,
    storage: Option<FileStorage>,
    kdf_rounds: u32,
    session_ttl: Duration,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self {
            directory: RwLock::default(),
            storage: None,
            kdf_rounds: DEFAULT_KDF_ROUNDS,
            session_ttl: Duration::hours(i64::from(DEFAULT_SESSION_TTL_HOURS)),
        }
    }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a provider whose accounts are saved to `storage`, loading the
    /// accounts saved by a previous run.
    pub async fn with_storage(storage: FileStorage) -> Result<Self> {
        let accounts: Accounts = storage.load::<Accounts>().await?.unwrap_or_default();
        info!(
            path = ?storage.snapshot_path(),
            accounts = accounts.len(),
            "Loaded accounts"
        );
        Ok(Self {
            directory: RwLock::new(Directory {
                accounts,
                sessions: HashMap::new(),
            }),
            storage: Some(storage),
            ..Self::default()
        })
    }

    /// Rounds for digests created from now on. Existing accounts keep the
    /// rounds they were registered with.
    pub fn with_kdf_rounds(mut self, rounds: u32) -> Self {
        self.kdf_rounds = rounds.max(1);
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub async fn account_count(&self) -> usize {
        self.directory.read().await.accounts.len()
    }

    /// Sessions still held, expired ones included until the next sign-in.
    pub async fn session_count(&self) -> usize {
        self.directory.read().await.sessions.len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn register(&self, email: &str, password: &str, full_name: &str) -> Result<Session> {
        validate_registration(email, password, full_name)?;
        let email = normalize_email(email);

        let salt = new_salt();
        let digest = derive_blocking(salt.clone(), password.to_string(), self.kdf_rounds).await?;
        let account = Account {
            profile_id: ProfileId::generate(),
            salt,
            rounds: self.kdf_rounds,
            digest,
        };

        let mut directory = self.directory.write().await;
        if directory.accounts.contains_key(&email) {
            warn!("Registration for an existing account");
            return Err(AccessError::AccountExists.into());
        }

        let mut staged = directory.accounts.clone();
        staged.insert(email, account.clone());
        if let Some(storage) = &self.storage {
            storage.save(&staged).await?;
        }
        directory.accounts = staged;

        info!(profile_id = %account.profile_id, "Account registered");
        Ok(directory.open_session(&account.profile_id, self.session_ttl))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        validate_credentials(email, password)?;
        let email = normalize_email(email);

        let account = self.directory.read().await.accounts.get(&email).cloned();
        let Some(account) = account else {
            // Unknown emails cost one derivation too.
            derive_blocking(new_salt(), password.to_string(), self.kdf_rounds).await?;
            warn!("Rejected sign-in");
            return Err(AccessError::InvalidCredentials.into());
        };

        let digest =
            derive_blocking(account.salt.clone(), password.to_string(), account.rounds).await?;
        if !account.matches(&digest) {
            warn!("Rejected sign-in");
            return Err(AccessError::InvalidCredentials.into());
        }

        info!(profile_id = %account.profile_id, "Signed in");
        let mut directory = self.directory.write().await;
        Ok(directory.open_session(&account.profile_id, self.session_ttl))
    }

    async fn logout(&self, session_token: &str) -> Result<bool> {
        let removed = self.directory.write().await.sessions.remove(session_token);
        if let Some(session) = &removed {
            info!(profile_id = %session.profile_id, "Signed out");
        }
        Ok(removed.is_some())
    }

    async fn identify(&self, session_token: &str) -> Result<Option<Identity>> {
        let directory = self.directory.read().await;
        let identity = directory
            .sessions
            .get(session_token)
            .filter(|s| s.expires_at > Utc::now())
            .map(|s| Identity::new(s.profile_id.clone()));
        if identity.is_none() {
            debug!("Unknown or expired session token");
        }
        Ok(identity)
    }
}
