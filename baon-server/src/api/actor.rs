//! Caller identity extractor
//!
//! Authentication happens upstream (the platform's auth layer fronts
//! this service); the resolved identity and role arrive in trusted
//! headers. Requests without both headers are rejected before any
//! handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared::{Actor, Role};

use super::error::ApiError;

/// Header carrying the authenticated caller id
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the resolved role (PARENT | STAFF | ADMIN)
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extracts the pre-authenticated caller from request headers.
pub struct CallerIdentity(pub Actor);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::unauthorized(format!("missing {ACTOR_ID_HEADER} header")))?;

        let role: Role = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized(format!("missing {ACTOR_ROLE_HEADER} header")))?
            .parse()
            .map_err(ApiError::unauthorized)?;

        Ok(CallerIdentity(Actor::new(id, role)))
    }
}
