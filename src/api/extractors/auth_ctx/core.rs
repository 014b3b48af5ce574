use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Principal;

use super::AuthCtx;

/// Handlers can take `AuthCtx` directly.
/// A request that never went through the authorization filter is treated as anonymous.
impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<AuthCtx>().cloned().unwrap_or_default())
    }
}

/// Extractor for handlers that need the caller's identity.
/// Anonymous requests are rejected with 401.
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .and_then(|ctx| ctx.principal().cloned())
            .map(Authenticated)
            .ok_or(AppError::Unauthorized)
    }
}
