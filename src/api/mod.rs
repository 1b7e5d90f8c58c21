//! HTTP API for the dashboard.
//!
//! All failures surface as transient `{ "error": .. }` messages scoped to
//! the request that triggered them; nothing is retried here.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::configure;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// User-visible request failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before any write was attempted.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// Store or identity-provider failure; the cause is logged, the
    /// caller gets a generic message.
    #[error("Service temporarily unavailable")]
    Upstream,
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::NotAuthenticated => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::WeakPassword => ApiError::Validation(err.to_string()),
            AuthError::Store(_) | AuthError::Hashing(_) | AuthError::Token(_) => {
                error!("identity provider failure: {err}");
                ApiError::Upstream
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("record store failure: {err:#}");
        ApiError::Upstream
    }
}
