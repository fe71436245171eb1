//! Mapping of core errors onto HTTP responses.

use axum::Json;
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use ridersaid_emergency::Language;
use ridersaid_errors::{AccessError, ErrorKind, ErrorSeverity, RidersAidError, ValidationError};
use serde::Serialize;
use tracing::{debug, error, warn};

/// JSON error body: `{"error": "<code>", "message": "<text>"}`, plus the
/// offending `field` for validation errors and a longer `detail` where one
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            field: None,
            detail: None,
        }
    }
}

/// `Retry-After` sent with store outages.
const RETRY_AFTER_SECS: &str = "5";

fn code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Unauthenticated => "unauthenticated",
        ErrorKind::NotFound => "not_found",
        ErrorKind::ValidationFailed => "validation_failed",
        ErrorKind::StoreUnavailable => "store_unavailable",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Config | ErrorKind::Internal => "internal",
    }
}

/// A core error on its way to the client, plus the language to explain
/// it in.
#[derive(Debug)]
pub struct ApiError {
    source: RidersAidError,
    language: Language,
}

impl ApiError {
    pub fn new(source: RidersAidError, language: Language) -> Self {
        Self { source, language }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn status(&self) -> StatusCode {
        match self.source.kind() {
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Config | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let labels = self.language.labels();
        match &self.source {
            RidersAidError::Access(AccessError::ProfileNotFound) => ErrorBody {
                detail: Some(labels.profile_not_found_detail.to_string()),
                ..ErrorBody::new("profile_not_found", labels.profile_not_found)
            },
            RidersAidError::Validation(v) => ErrorBody {
                field: Some(v.field().to_string()),
                ..ErrorBody::new("validation_failed", v.to_string())
            },
            RidersAidError::Access(e) => ErrorBody::new(code(e.kind()), e.to_string()),
            RidersAidError::Store(_) => {
                ErrorBody::new("store_unavailable", "Service temporarily unavailable")
            }
            RidersAidError::Config(_) | RidersAidError::Other(_) => {
                ErrorBody::new("internal", "Internal server error")
            }
        }
    }

    /// Log the failure at a level matching its severity.
    fn log(&self) {
        let kind = self.source.kind();
        match self.source.severity() {
            ErrorSeverity::Info => debug!(%kind, "Request rejected: {}", self.source),
            ErrorSeverity::Warning => warn!(%kind, "Request rejected: {}", self.source),
            severity @ (ErrorSeverity::Error | ErrorSeverity::Critical) => {
                error!(%kind, %severity, "Request failed: {}", self.source)
            }
        }
    }
}

impl From<RidersAidError> for ApiError {
    fn from(source: RidersAidError) -> Self {
        Self::new(source, Language::default())
    }
}

impl From<ValidationError> for ApiError {
    fn from(source: ValidationError) -> Self {
        RidersAidError::from(source).into()
    }
}

impl From<AccessError> for ApiError {
    fn from(source: AccessError) -> Self {
        RidersAidError::from(source).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let mut response = (self.status(), Json(self.body())).into_response();
        if self.source.is_transient() {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

/// Attach the request language to errors from the core.
pub trait Localize<T> {
    fn localized(self, language: Language) -> Result<T, ApiError>;
}

impl<T, E: Into<RidersAidError>> Localize<T> for Result<T, E> {
    fn localized(self, language: Language) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e.into(), language))
    }
}
