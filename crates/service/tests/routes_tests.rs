//! Route tests driven through the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{Request, StatusCode};
use insta::assert_snapshot;
use ridersaid_emergency::{SequenceTokenSource, TokenLifecycle};
use ridersaid_service::{AppState, MemoryIdentityProvider, ServiceConfig, router};
use ridersaid_store::RecordStore;
use ridersaid_test_helpers::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Cheap password digests for tests.
const KDF_ROUNDS: u32 = 16;

struct TestApp {
    store: Arc<CountingStore>,
    app: Router,
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl Reply {
    fn json(&self) -> Value {
        if self.body.is_empty() {
            return Value::Null;
        }
        must(serde_json::from_str(&self.body))
    }
}

async fn dispatch(
    app: &Router,
    method: &str,
    uri: &str,
    session: Option<&str>,
    language: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header(AUTHORIZATION, format!("Bearer {session}"));
    }
    if let Some(language) = language {
        builder = builder.header(ACCEPT_LANGUAGE, language);
    }
    let request = match body {
        Some(body) => must(
            builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
        ),
        None => must(builder.body(Body::empty())),
    };

    let response = must(app.clone().oneshot(request).await);
    let status = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = must(axum::body::to_bytes(response.into_body(), usize::MAX).await);
    Reply {
        status,
        location,
        body: must(String::from_utf8(bytes.to_vec())),
    }
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(CountingStore::in_memory());
        let shared: Arc<dyn RecordStore> = store.clone();
        let mut config = ServiceConfig::default();
        config.http.public_origin = "https://ridersaid.test/".into();
        let state = AppState::new(
            shared.clone(),
            Arc::new(MemoryIdentityProvider::new().with_kdf_rounds(KDF_ROUNDS)),
            config,
        )
        .with_tokens(
            TokenLifecycle::new(shared).with_source(Arc::new(SequenceTokenSource::new([
                "tok-first",
                "tok-second",
            ]))),
        );
        Self {
            store,
            app: router(state),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        session: Option<&str>,
        language: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        dispatch(&self.app, method, uri, session, language, body).await
    }

    async fn get(&self, uri: &str, session: Option<&str>) -> Reply {
        self.send("GET", uri, session, None, None).await
    }

    /// Register a rider and return `(session token, profile id)`.
    async fn register(&self, email: &str, full_name: &str) -> (String, String) {
        let reply = self
            .send(
                "POST",
                "/auth/register",
                None,
                None,
                Some(json!({ "email": email, "password": "secret1", "fullName": full_name })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        let body = reply.json();
        let token = must_some(body["token"].as_str(), "session token").to_string();
        let profile_id = must_some(body["profileId"].as_str(), "profile id").to_string();
        (token, profile_id)
    }
}

mod public {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let reply = app.get("/health", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_token_is_localized_404_without_dependent_reads() {
        let app = TestApp::new();

        let reply = app
            .send("GET", "/e/not-a-token", None, Some("en-US,en;q=0.9"), None)
            .await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_snapshot!(
            reply.body,
            @r#"{"error":"profile_not_found","message":"Profile not found","detail":"This emergency profile does not exist or the link is invalid."}"#
        );

        let reply = app.get("/e/not-a-token", None).await;
        assert_snapshot!(
            reply.body,
            @r#"{"error":"profile_not_found","message":"Profil nicht gefunden","detail":"Dieses Notfall-Profil existiert nicht oder der Link ist ungültig."}"#
        );

        assert_eq!(app.store.dependent_calls(), 0);
    }

    #[tokio::test]
    async fn test_emergency_view_after_token_issue() {
        let app = TestApp::new();
        let (session, _) = app.register("max@example.org", "Max Mustermann").await;

        let reply = app
            .send(
                "PATCH",
                "/api/profile",
                Some(&session),
                None,
                Some(json!({
                    "birth_date": "1985-03-15",
                    "blood_type": "A",
                    "rh_factor": "+",
                    "is_organ_donor": true
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);

        let reply = app
            .send(
                "POST",
                "/api/implants",
                Some(&session),
                None,
                Some(json!({ "name": "Pacemaker", "year": 2021 })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);

        let reply = app
            .send("POST", "/api/token", Some(&session), None, None)
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let issued = reply.json();
        assert_eq!(issued["token"], "tok-first");
        assert_eq!(issued["link"], "https://ridersaid.test/e/tok-first");

        let reply = app
            .send("GET", "/e/tok-first", None, Some("en"), None)
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let record = reply.json();
        assert_eq!(record["personal"]["name"], "Max Mustermann");
        assert_eq!(record["personal"]["birthDate"], "1985-03-15");
        assert_eq!(record["blood"]["display"], "A+");
        assert_eq!(record["organDonor"], true);
        assert_eq!(record["implants"]["items"][0], "Pacemaker (2021)");
        assert_eq!(record["allergies"]["state"], "empty");
        assert_eq!(record["allergies"]["placeholder"], "None");
        assert!(!reply.body.contains("tok-first"));
    }

    #[tokio::test]
    async fn test_rotation_invalidates_old_link() {
        let app = TestApp::new();
        let (session, _) = app.register("max@example.org", "Max").await;

        app.send("POST", "/api/token", Some(&session), None, None).await;
        let reply = app
            .send("POST", "/api/token/rotate", Some(&session), None, None)
            .await;
        assert_eq!(reply.json()["token"], "tok-second");

        assert_eq!(app.get("/e/tok-first", None).await.status, StatusCode::NOT_FOUND);
        assert_eq!(app.get("/e/tok-second", None).await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_revoked_token_stops_resolving() {
        let app = TestApp::new();
        let (session, _) = app.register("max@example.org", "Max").await;
        app.send("POST", "/api/token", Some(&session), None, None).await;

        let reply = app
            .send("DELETE", "/api/token", Some(&session), None, None)
            .await;
        assert_eq!(reply.json(), json!({ "revoked": true }));
        assert_eq!(app.get("/e/tok-first", None).await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_owner_preview_by_profile_id() {
        let app = TestApp::new();
        let (session, profile_id) = app.register("max@example.org", "Max").await;
        let uri = format!("/e/{profile_id}");

        let reply = app.get(&uri, Some(&session)).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["personal"]["name"], "Max");

        assert_eq!(app.get(&uri, None).await.status, StatusCode::NOT_FOUND);

        let (other, _) = app.register("erika@example.org", "Erika").await;
        assert_eq!(app.get(&uri, Some(&other)).await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_outage_is_503() {
        let app = TestApp::new();
        app.store.set_unavailable(true);

        let reply = app.get("/e/some-token", None).await;
        assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(reply.json()["error"], "store_unavailable");
    }

    #[tokio::test]
    async fn test_demo_page_needs_no_account_or_store() {
        let app = TestApp::new();
        app.store.set_unavailable(true);

        let reply = app.send("GET", "/e/demo", None, Some("en"), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        let body = reply.json();
        assert_eq!(body["language"], "en");
        assert_eq!(body["personal"]["name"], "Max Mustermann");
        assert_eq!(body["blood"]["display"], "A+");
        assert_eq!(body["organDonor"], true);
        assert_eq!(body["allergies"]["items"][0]["critical"], true);
        assert_eq!(body["contacts"]["items"][1]["dial"], "+49309876543");
        assert_eq!(app.store.total_calls(), 0);
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_dashboard_redirects_anonymous_callers() {
        let app = TestApp::new();
        let reply = app.get("/dashboard", None).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location.as_deref(), Some("/auth"));

        let reply = app.get("/dashboard", Some("stale-session")).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_auth_form_redirects_signed_in_callers() {
        let app = TestApp::new();
        let reply = app.get("/auth", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["minPasswordLength"], 6);

        let (session, _) = app.register("max@example.org", "Max").await;
        let reply = app.get("/auth", Some(&session)).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location.as_deref(), Some("/dashboard"));
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let app = TestApp::new();
        let (_, profile_id) = app.register("max@example.org", "Max").await;

        let reply = app
            .send(
                "POST",
                "/auth/login",
                None,
                None,
                Some(json!({ "email": "max@example.org", "password": "wrong-pw" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let reply = app
            .send(
                "POST",
                "/auth/login",
                None,
                None,
                Some(json!({ "email": "max@example.org", "password": "secret1" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let body = reply.json();
        assert_eq!(body["profileId"], profile_id.as_str());
        let session = must_some(body["token"].as_str(), "session token").to_string();

        let reply = app
            .send("POST", "/auth/logout", Some(&session), None, None)
            .await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);
        assert_eq!(
            app.get("/dashboard", Some(&session)).await.status,
            StatusCode::SEE_OTHER
        );
    }

    #[tokio::test]
    async fn test_registration_validation() {
        let app = TestApp::new();
        let reply = app
            .send(
                "POST",
                "/auth/register",
                None,
                None,
                Some(json!({ "email": "max@example.org", "password": "abc", "fullName": "Max" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.json()["field"], "password");

        app.register("max@example.org", "Max").await;
        let reply = app
            .send(
                "POST",
                "/auth/register",
                None,
                None,
                Some(json!({
                    "email": "max@example.org",
                    "password": "secret1",
                    "fullName": "Max"
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CONFLICT);
    }
}

mod owner {
    use super::*;

    #[tokio::test]
    async fn test_dashboard_lists_records_and_links() {
        let app = TestApp::new();
        let (session, profile_id) = app.register("max@example.org", "Max").await;
        app.send(
            "POST",
            "/api/allergies",
            Some(&session),
            None,
            Some(json!({ "type": "medication", "name": "Penicillin", "severity": "severe" })),
        )
        .await;

        let reply = app.get("/dashboard", Some(&session)).await;
        assert_eq!(reply.status, StatusCode::OK);
        let view = reply.json();
        assert_eq!(view["profile"]["full_name"], "Max");
        assert_eq!(view["allergies"][0]["name"], "Penicillin");
        assert_eq!(view["links"]["public"], Value::Null);
        assert_eq!(
            view["links"]["preview"],
            format!("https://ridersaid.test/e/{profile_id}").as_str()
        );
    }

    #[tokio::test]
    async fn test_writes_require_session() {
        let app = TestApp::new();
        let cases = [
            ("PATCH", "/api/profile", Some(json!({ "full_name": "X" }))),
            ("POST", "/api/allergies", Some(json!({ "name": "Pollen" }))),
            ("POST", "/api/token", None),
            ("POST", "/api/token/rotate", None),
            ("DELETE", "/api/token", None),
        ];
        for (method, uri, body) in cases {
            let reply = app.send(method, uri, None, None, body).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
        assert_eq!(app.store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_payloads_are_422() {
        let app = TestApp::new();
        let (session, _) = app.register("max@example.org", "Max").await;
        app.store.reset();

        let reply = app
            .send(
                "POST",
                "/api/emergency_contacts",
                Some(&session),
                None,
                Some(json!({ "name": "Erika", "relationship": "Partner", "phone": " " })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.json()["field"], "phone");

        let reply = app
            .send(
                "POST",
                "/api/vaccinations",
                Some(&session),
                None,
                Some(json!({ "name": "Tetanus" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);

        let reply = app
            .send(
                "PATCH",
                "/api/profile",
                Some(&session),
                None,
                Some(json!({ "access_token": "mine-now" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(app.store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_owner() {
        let app = TestApp::new();
        let (alice, _) = app.register("alice@example.org", "Alice").await;
        let (bob, _) = app.register("bob@example.org", "Bob").await;

        let reply = app
            .send(
                "POST",
                "/api/conditions",
                Some(&alice),
                None,
                Some(json!({ "name": "Diabetes" })),
            )
            .await;
        let created = reply.json();
        assert_eq!(created["collection"], "conditions");
        let id = must_some(created["row"]["id"].as_str(), "record id").to_string();
        let uri = format!("/api/conditions/{id}");

        let reply = app.send("DELETE", &uri, Some(&bob), None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.json()["error"], "not_found");

        let reply = app.send("DELETE", &uri, Some(&alice), None, None).await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);

        let reply = app.send("DELETE", &uri, Some(&alice), None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_payload_profile_id_is_ignored() {
        let app = TestApp::new();
        let (alice, alice_id) = app.register("alice@example.org", "Alice").await;
        let (_, bob_id) = app.register("bob@example.org", "Bob").await;

        let reply = app
            .send(
                "POST",
                "/api/medications",
                Some(&alice),
                None,
                Some(json!({ "name": "Metformin", "dosage": "500mg", "profile_id": bob_id })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.json()["row"]["profile_id"], alice_id.as_str());
    }

    #[tokio::test]
    async fn test_malformed_record_id_is_422() {
        let app = TestApp::new();
        let (session, _) = app.register("max@example.org", "Max").await;
        let reply = app
            .send("DELETE", "/api/implants/not-a-uuid", Some(&session), None, None)
            .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.json()["field"], "id");
    }
}

mod restart {
    use super::*;
    use tempfile::TempDir;

    async fn open(dir: &TempDir) -> Router {
        let mut config = ServiceConfig::default();
        config.store.snapshot_path = Some(dir.path().join("store.json"));
        config.identity.kdf_rounds = KDF_ROUNDS;
        router(must(AppState::from_config(config).await))
    }

    #[tokio::test]
    async fn test_owner_keeps_control_of_link_after_restart() {
        let dir = must(TempDir::new());

        let (session, profile_id, token) = {
            let app = open(&dir).await;
            let reply = dispatch(
                &app,
                "POST",
                "/auth/register",
                None,
                None,
                Some(json!({
                    "email": "max@example.org",
                    "password": "secret1",
                    "fullName": "Max"
                })),
            )
            .await;
            assert_eq!(reply.status, StatusCode::CREATED);
            let body = reply.json();
            let session = must_some(body["token"].as_str(), "session token").to_string();
            let profile_id = must_some(body["profileId"].as_str(), "profile id").to_string();

            let reply = dispatch(&app, "POST", "/api/token", Some(&session), None, None).await;
            let token = must_some(reply.json()["token"].as_str(), "access token").to_string();
            (session, profile_id, token)
        };

        let app = open(&dir).await;
        let public = format!("/e/{token}");
        let reply = dispatch(&app, "GET", &public, None, None, None).await;
        assert_eq!(reply.status, StatusCode::OK);

        let reply = dispatch(&app, "GET", "/dashboard", Some(&session), None, None).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);

        let reply = dispatch(
            &app,
            "POST",
            "/auth/login",
            None,
            None,
            Some(json!({ "email": "max@example.org", "password": "secret1" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        let body = reply.json();
        assert_eq!(body["profileId"], profile_id.as_str());
        let session = must_some(body["token"].as_str(), "session token").to_string();

        let reply = dispatch(&app, "DELETE", "/api/token", Some(&session), None, None).await;
        assert_eq!(reply.json(), json!({ "revoked": true }));
        let reply = dispatch(&app, "GET", &public, None, None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }
}
