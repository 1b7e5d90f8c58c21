//! Bearer-token extraction for handlers.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::auth::AuthUser;

use super::handlers::AppState;
use super::ApiError;

/// Caller identity, required. Extraction fails with 401 when the
/// Authorization header is missing or the token does not verify.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthUser);

/// Caller identity, optional. Read endpoints answer anonymous callers
/// with the empty view instead of failing.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<AuthUser>);

fn bearer_user(req: &HttpRequest) -> Option<AuthUser> {
    let state = req.app_data::<web::Data<AppState>>()?;
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    state.auth.verify(token).ok()
}

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            bearer_user(req)
                .map(Authenticated)
                .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string())),
        )
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeAuthenticated(bearer_user(req))))
    }
}
