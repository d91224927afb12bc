// Caller identity as established by the authentication middleware

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{models::AccessTokenClaims, utils::ApiError};

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub is_business: bool,
}

impl TryFrom<AccessTokenClaims> for AuthenticatedUser {
    type Error = uuid::Error;

    fn try_from(claims: AccessTokenClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            email: claims.email,
            is_admin: claims.admin,
            is_business: claims.business,
        })
    }
}

/// Marker left in request extensions when a bearer token was supplied but
/// did not verify
#[derive(Debug, Clone, Copy)]
pub struct RejectedToken;

impl AuthenticatedUser {
    /// Identity attached to the request, or the 401 explaining its absence
    pub fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        if parts.extensions.get::<RejectedToken>().is_some() {
            Err(ApiError::unauthorized("Invalid or expired token"))
        } else {
            Err(ApiError::unauthorized("Authentication required"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        AuthenticatedUser::from_parts(parts)
    }
}
