use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::{authorize, Claims, RoleRequirement};
use crate::error::ApiError;

/// Extractor for routes open to any verified caller.
///
/// Reads the `Claims` the authentication layer stored on the request; a
/// handler taking this argument cannot run without a verified identity.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

/// Extractor for admin-only routes. Verified identity plus an `admin` role
/// claim; anything else is rejected before the handler body runs.
#[derive(Debug, Clone)]
pub struct Admin(pub Claims);

fn claims_from_parts(parts: &Parts) -> Result<Claims, ApiError> {
    parts.extensions.get::<Claims>().cloned().ok_or_else(|| {
        // Reaching this means a gated route was wired without the
        // authenticate layer. Fail closed.
        tracing::error!("claims missing from request extensions; authenticate layer not applied");
        ApiError::unauthorized("unauthenticated")
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts)?;
        authorize(&claims, RoleRequirement::Authenticated)?;
        Ok(Self(claims))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts)?;
        authorize(&claims, RoleRequirement::Admin)?;
        Ok(Self(claims))
    }
}
