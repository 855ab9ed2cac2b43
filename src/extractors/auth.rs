//! Resolve the signed-in user from the `Authorization` header.

use crate::error::BackendError;
use crate::state::{BackendState, DEFAULT_USER_ID};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Owner of the entries a request reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl FromRequestParts<BackendState> for CurrentUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &BackendState) -> Result<Self, Self::Rejection> {
        let Some(expected) = &state.auth else {
            return Ok(CurrentUser(DEFAULT_USER_ID));
        };
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix(BEARER_PREFIX))
            .map(str::trim);
        match presented {
            Some(token) if token == expected.token => Ok(CurrentUser(expected.user_id)),
            _ => {
                tracing::debug!(path = %parts.uri.path(), "rejected bearer token");
                Err(BackendError::Unauthorized)
            }
        }
    }
}
