//! Request context: who is calling and in which language to answer.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT_LANGUAGE, AUTHORIZATION};
use axum::http::request::Parts;
use ridersaid_emergency::Language;
use ridersaid_errors::AccessError;
use ridersaid_records::Identity;

use crate::error::{ApiError, Localize};
use crate::state::AppState;

/// The bearer token of `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// An unknown or expired session is treated as anonymous, not as an error.
pub struct Caller {
    identity: Option<Identity>,
    session: Option<String>,
    pub language: Language,
}

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn require(&self) -> Result<&Identity, ApiError> {
        self.identity
            .as_ref()
            .ok_or_else(|| ApiError::new(AccessError::Unauthenticated.into(), self.language))
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        let language = Language::detect(accept, state.config.i18n.default_language);

        let session = bearer_token(&parts.headers);
        let identity = match &session {
            Some(token) => state.identity.identify(token).await.localized(language)?,
            None => None,
        };

        Ok(Self {
            identity,
            session,
            language,
        })
    }
}
