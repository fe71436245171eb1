//! Identifiers and the acting identity.

use std::fmt;

use ridersaid_errors::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile identifier. Equal to the identity id of the profile's owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ProfileId(String);

impl ProfileId {
    /// Wrap an identity id, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::required("profile_id"));
        }
        Ok(Self(value))
    }

    /// Fresh random identifier, used when a new identity signs up.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProfileId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProfileId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProfileId> for String {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

/// Identifier of a row in one of the dependent collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("id", e.to_string()))
    }
}

/// Opaque public access token.
///
/// Knowing the token is equivalent to read access to the profile's emergency
/// view, so the `Debug` output never contains the value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token string. Empty and whitespace-only strings are not tokens.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccessToken {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| ValidationError::required("access_token"))
    }
}

impl From<AccessToken> for String {
    fn from(token: AccessToken) -> Self {
        token.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<{} chars>)", self.0.len())
    }
}

/// The authenticated caller, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: ProfileId,
}

impl Identity {
    pub fn new(id: ProfileId) -> Self {
        Self { id }
    }

    /// Whether this identity owns the given profile.
    pub fn owns(&self, profile_id: &ProfileId) -> bool {
        &self.id == profile_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_profile_id_is_rejected() {
        assert_eq!(ProfileId::new("   ").ok(), None);
        assert_eq!(ProfileId::new("user-1").ok().as_ref().map(ProfileId::as_str), Some("user-1"));
    }

    #[test]
    fn test_blank_profile_id_never_deserializes() {
        let parsed: Result<ProfileId, _> = serde_json::from_str(r#""  ""#);
        assert_eq!(parsed.ok(), None);
        let parsed: Result<ProfileId, _> = serde_json::from_str(r#""user-1""#);
        assert_eq!(parsed.ok(), ProfileId::new("user-1").ok());
        assert_eq!(
            serde_json::to_string(&ProfileId::generate()).map(|s| s.starts_with('"')).ok(),
            Some(true)
        );
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("s3cr3t-value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn test_blank_token_is_not_a_token() {
        assert!(AccessToken::new("").is_none());
        assert!(AccessToken::new(" \t\n").is_none());
        assert!(AccessToken::new("abc").is_some());

        let parsed: Result<Option<AccessToken>, _> = serde_json::from_str(r#""   ""#);
        assert!(parsed.ok().is_none());
        let parsed: Result<Option<AccessToken>, _> = serde_json::from_str("null");
        assert_eq!(parsed.ok(), Some(None));
    }

    #[test]
    fn test_record_id_parse() {
        let id = RecordId::generate();
        let parsed: Result<RecordId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
        assert_eq!("not-a-uuid".parse::<RecordId>().ok(), None);
    }
}
