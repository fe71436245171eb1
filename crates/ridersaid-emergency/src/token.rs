//! Access token lifecycle: issue, rotate, revoke.

use std::collections::VecDeque;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use parking_lot::Mutex;
use rand::RngCore;
use rand::rngs::OsRng;
use ridersaid_errors::{AccessError, Result, ResultExt, RidersAidError, error_context};
use ridersaid_records::{AccessToken, Identity};
use ridersaid_store::{RecordStore, TokenAssignment, TokenWrite};
use tracing::{info, warn};

use crate::owner::require_identity;

pub const TOKEN_BYTES: usize = 32;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Source of candidate tokens.
pub trait TokenSource: Send + Sync {
    fn generate(&self) -> AccessToken;
}

/// 32 bytes from the OS RNG, URL-safe base64 without padding.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn generate(&self) -> AccessToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        // 32 bytes always encode to 43 characters, so this never retries.
        AccessToken::new(URL_SAFE_NO_PAD.encode(bytes)).unwrap_or_else(|| self.generate())
    }
}

/// Hands out the given values in order, then falls back to random tokens.
#[derive(Debug, Default)]
pub struct SequenceTokenSource {
    queue: Mutex<VecDeque<AccessToken>>,
}

impl SequenceTokenSource {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(values.into_iter().filter_map(AccessToken::new).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }
}

impl TokenSource for SequenceTokenSource {
    fn generate(&self) -> AccessToken {
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| RandomTokenSource.generate())
    }
}

#[derive(Clone)]
pub struct TokenLifecycle {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn TokenSource>,
    max_attempts: u32,
}

impl TokenLifecycle {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            source: Arc::new(RandomTokenSource),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.source = source;
        self
    }

    /// At least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Issue the profile's token. A profile that already has one keeps it.
    pub async fn issue_token(&self, identity: Option<&Identity>) -> Result<AccessToken> {
        let identity = require_identity(identity)?;
        self.write(identity, TokenWrite::IfUnset).await
    }

    /// Replace the token. The previous one stops resolving when this returns.
    pub async fn rotate_token(&self, identity: Option<&Identity>) -> Result<AccessToken> {
        let identity = require_identity(identity)?;
        self.write(identity, TokenWrite::Replace).await
    }

    /// Remove the token so the profile has no public view. Returns whether
    /// a token was set.
    pub async fn revoke_token(&self, identity: Option<&Identity>) -> Result<bool> {
        let identity = require_identity(identity)?;
        let revoked = self
            .store
            .clear_token(identity, Utc::now())
            .await
            .with_context("revoke_access_token")?;
        if revoked {
            info!(profile_id = %identity.id, "Access token revoked");
        }
        Ok(revoked)
    }

    async fn write(&self, identity: &Identity, mode: TokenWrite) -> Result<AccessToken> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.source.generate();
            match self
                .store
                .assign_token(identity, candidate, mode, Utc::now())
                .await
                .context(error_context!(
                    "assign_access_token",
                    "mode" => format!("{mode:?}"),
                    "attempt" => attempt.to_string(),
                ))?
            {
                TokenAssignment::Assigned(token) => {
                    info!(profile_id = %identity.id, attempt, ?mode, "Access token issued");
                    return Ok(token);
                }
                TokenAssignment::Existing(token) => return Ok(token),
                TokenAssignment::Collision => {
                    warn!(
                        profile_id = %identity.id,
                        attempt,
                        "Access token collision, regenerating"
                    );
                }
            }
        }
        Err(RidersAidError::from(AccessError::TokenCollision {
            attempts: self.max_attempts,
        }))
    }
}
