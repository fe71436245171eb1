//! HTTP route surface.
//!
//! `/e/{token}` and `/e/demo` are the only routes open to anonymous callers
//! besides the auth endpoints and `/health`. Everything under `/api` acts on the
//! caller's own profile.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use ridersaid_emergency::{
    AggregationContext, EmergencyLinks, EmergencyRecord, OwnerSnapshot, demo_input, public_link,
};
use ridersaid_errors::{AccessError, ValidationError};
use ridersaid_records::validation::MIN_PASSWORD_LEN;
use ridersaid_records::{
    Allergy, Collection, Condition, EmergencyContact, Implant, Medication, NewRow, Profile,
    ProfilePatch, RecordId, Row,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, Localize};
use crate::extract::Caller;
use crate::identity::Session;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/e/demo", get(demo_view))
        .route("/e/{token}", get(emergency_view))
        .route("/dashboard", get(dashboard))
        .route("/auth", get(auth_form))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/api/profile", patch(update_profile))
        .route("/api/token", post(issue_token).delete(revoke_token))
        .route("/api/token/rotate", post(rotate_token))
        .route("/api/{collection}", post(add_record))
        .route("/api/{collection}/{id}", delete(delete_record))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "service": "ridersaid",
    }))
}

/// Public emergency view. The authenticated owner may also pass their own
/// profile id to preview the page before a token exists.
async fn emergency_view(
    State(state): State<AppState>,
    caller: Caller,
    Path(segment): Path<String>,
) -> Result<Json<EmergencyRecord>, ApiError> {
    let language = caller.language;
    let input = match caller.identity() {
        Some(identity) if identity.id.as_str() == segment => {
            debug!(profile_id = %identity.id, "Serving owner preview");
            state.owner.resolve_by_identity(Some(identity)).await
        }
        _ => state.public.resolve_by_token(&segment).await,
    }
    .localized(language)?;

    let ctx = AggregationContext::new(language, Utc::now());
    Ok(Json(input.aggregate(&ctx)))
}

/// Sample emergency page. Reads nothing from the store.
async fn demo_view(caller: Caller) -> Result<Json<EmergencyRecord>, ApiError> {
    let input = demo_input().localized(caller.language)?;
    let ctx = AggregationContext::new(caller.language, Utc::now());
    Ok(Json(input.aggregate(&ctx)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub profile: Profile,
    pub allergies: Vec<Allergy>,
    pub medications: Vec<Medication>,
    pub conditions: Vec<Condition>,
    pub implants: Vec<Implant>,
    pub emergency_contacts: Vec<EmergencyContact>,
    pub links: EmergencyLinks,
}

impl DashboardView {
    fn new(snapshot: OwnerSnapshot, origin: &str) -> Self {
        let links = EmergencyLinks::new(
            origin,
            &snapshot.profile.id,
            snapshot.profile.access_token.as_ref(),
        );
        Self {
            profile: snapshot.profile,
            allergies: snapshot.allergies,
            medications: snapshot.medications,
            conditions: snapshot.conditions,
            implants: snapshot.implants,
            emergency_contacts: snapshot.contacts,
            links,
        }
    }
}

async fn dashboard(State(state): State<AppState>, caller: Caller) -> Result<Response, ApiError> {
    let Some(identity) = caller.identity() else {
        return Ok(Redirect::to("/auth").into_response());
    };
    let language = caller.language;

    state
        .owner
        .ensure_profile(Some(identity), None)
        .await
        .localized(language)?;
    let snapshot = state
        .owner
        .load_snapshot(Some(identity))
        .await
        .localized(language)?;

    let view = DashboardView::new(snapshot, &state.config.http.public_origin);
    Ok(Json(view).into_response())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthForm {
    pub login: String,
    pub register: String,
    pub min_password_length: usize,
}

async fn auth_form(caller: Caller) -> Response {
    if caller.identity().is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Json(AuthForm {
        login: "/auth/login".into(),
        register: "/auth/register".into(),
        min_password_length: MIN_PASSWORD_LEN,
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn register(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let language = caller.language;
    let session = state
        .identity
        .register(&req.email, &req.password, &req.full_name)
        .await
        .localized(language)?;
    state
        .owner
        .ensure_profile(Some(&session.identity()), Some(req.full_name))
        .await
        .localized(language)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn login(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    let language = caller.language;
    let session = state
        .identity
        .login(&req.email, &req.password)
        .await
        .localized(language)?;
    state
        .owner
        .ensure_profile(Some(&session.identity()), None)
        .await
        .localized(language)?;
    Ok(Json(session))
}

async fn logout(State(state): State<AppState>, caller: Caller) -> Result<StatusCode, ApiError> {
    let Some(token) = caller.session_token() else {
        return Err(ApiError::new(
            AccessError::Unauthenticated.into(),
            caller.language,
        ));
    };
    state.identity.logout(token).await.localized(caller.language)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Profile>, ApiError> {
    let language = caller.language;
    let identity = caller.require()?;
    let patch: ProfilePatch = serde_json::from_value(body)
        .map_err(|e| ValidationError::invalid_format("profile", e.to_string()))
        .localized(language)?;
    let profile = state
        .owner
        .update_profile(Some(identity), &patch)
        .await
        .localized(language)?;
    Ok(Json(profile))
}

async fn add_record(
    State(state): State<AppState>,
    caller: Caller,
    Path(collection): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Row>), ApiError> {
    let language = caller.language;
    let identity = caller.require()?;
    let collection = collection.parse::<Collection>().localized(language)?;
    let new = NewRow::from_json(collection, body).localized(language)?;
    let row = state
        .owner
        .add_row(Some(identity), new)
        .await
        .localized(language)?;
    Ok((StatusCode::CREATED, Json(row)))
}

async fn delete_record(
    State(state): State<AppState>,
    caller: Caller,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let language = caller.language;
    let identity = caller.require()?;
    let collection = collection.parse::<Collection>().localized(language)?;
    let id = id.parse::<RecordId>().localized(language)?;
    state
        .owner
        .delete_row(Some(identity), collection, id)
        .await
        .localized(language)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenView {
    pub token: String,
    pub link: String,
}

async fn issue_token(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<TokenView>, ApiError> {
    let token = state
        .tokens
        .issue_token(caller.identity())
        .await
        .localized(caller.language)?;
    Ok(Json(TokenView {
        link: public_link(&state.config.http.public_origin, &token),
        token: token.as_str().to_string(),
    }))
}

async fn rotate_token(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<TokenView>, ApiError> {
    let token = state
        .tokens
        .rotate_token(caller.identity())
        .await
        .localized(caller.language)?;
    Ok(Json(TokenView {
        link: public_link(&state.config.http.public_origin, &token),
        token: token.as_str().to_string(),
    }))
}

async fn revoke_token(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<serde_json::Value>, ApiError> {
    let revoked = state
        .tokens
        .revoke_token(caller.identity())
        .await
        .localized(caller.language)?;
    Ok(Json(serde_json::json!({ "revoked": revoked })))
}
