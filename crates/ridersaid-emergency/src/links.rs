//! Emergency link formatting.

use ridersaid_records::{AccessToken, ProfileId};
use serde::{Deserialize, Serialize};

/// Links shown on the owner's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyLinks {
    /// Public link for QR codes and stickers. `None` until a token is issued.
    pub public: Option<String>,
    /// Owner-only preview, served only to the authenticated owner.
    pub preview: String,
}

fn base(origin: &str) -> &str {
    origin.trim_end_matches('/')
}

pub fn public_link(origin: &str, token: &AccessToken) -> String {
    format!("{}/e/{}", base(origin), token.as_str())
}

pub fn preview_link(origin: &str, profile_id: &ProfileId) -> String {
    format!("{}/e/{}", base(origin), profile_id)
}

impl EmergencyLinks {
    pub fn new(origin: &str, profile_id: &ProfileId, token: Option<&AccessToken>) -> Self {
        Self {
            public: token.map(|t| public_link(origin, t)),
            preview: preview_link(origin, profile_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_strip_trailing_slash() {
        let id = ProfileId::new("user-1").ok();
        let token = AccessToken::new("abc");
        let links = id.map(|id| EmergencyLinks::new("https://ridersaid.app/", &id, token.as_ref()));
        assert_eq!(
            links.as_ref().and_then(|l| l.public.as_deref()),
            Some("https://ridersaid.app/e/abc")
        );
        assert_eq!(
            links.map(|l| l.preview),
            Some("https://ridersaid.app/e/user-1".to_string())
        );
    }

    #[test]
    fn test_no_public_link_without_token() {
        let links = ProfileId::new("user-1")
            .ok()
            .map(|id| EmergencyLinks::new("http://localhost:8080", &id, None));
        assert_eq!(links.and_then(|l| l.public), None);
    }
}
