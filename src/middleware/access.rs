// Route-level access control
// A handler that takes `Authorized<P>` only runs when the caller satisfies
// policy `P` for the `{id}` in the path.

use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{middleware::auth::AuthenticatedUser, utils::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    AdminOnly,
    OwnerOrAdmin,
    OwnerOnly,
}

impl AccessPolicy {
    /// Whether the policy is evaluated against a target user id
    pub fn needs_target(self) -> bool {
        !matches!(self, AccessPolicy::AdminOnly)
    }

    pub fn allows(self, caller: &AuthenticatedUser, target: Option<Uuid>) -> bool {
        let is_owner = target == Some(caller.user_id);
        match self {
            AccessPolicy::AdminOnly => caller.is_admin,
            AccessPolicy::OwnerOrAdmin => is_owner || caller.is_admin,
            AccessPolicy::OwnerOnly => is_owner,
        }
    }
}

pub fn authorize(
    policy: AccessPolicy,
    caller: &AuthenticatedUser,
    target: Option<Uuid>,
) -> Result<(), ApiError> {
    if policy.allows(caller, target) {
        return Ok(());
    }

    tracing::info!(
        user_id = %caller.user_id,
        policy = ?policy,
        "Access denied"
    );

    let message = match policy {
        AccessPolicy::AdminOnly => "Only admin can access this resource",
        AccessPolicy::OwnerOrAdmin => "Only the account owner or admin can access this resource",
        AccessPolicy::OwnerOnly => "Only the account owner can access this resource",
    };
    Err(ApiError::forbidden(message))
}

/// Compile-time selector for an [`AccessPolicy`]
pub trait Policy: Send + Sync + 'static {
    const POLICY: AccessPolicy;
}

pub struct AdminOnly;
pub struct OwnerOrAdmin;
pub struct OwnerOnly;

impl Policy for AdminOnly {
    const POLICY: AccessPolicy = AccessPolicy::AdminOnly;
}

impl Policy for OwnerOrAdmin {
    const POLICY: AccessPolicy = AccessPolicy::OwnerOrAdmin;
}

impl Policy for OwnerOnly {
    const POLICY: AccessPolicy = AccessPolicy::OwnerOnly;
}

/// Proof that the caller passed policy `P`
pub struct Authorized<P: Policy> {
    pub caller: AuthenticatedUser,
    target: Option<Uuid>,
    _policy: PhantomData<P>,
}

impl<P: Policy> Authorized<P> {
    /// The `{id}` path segment the policy was checked against
    pub fn target_id(&self) -> Result<Uuid, ApiError> {
        self.target
            .ok_or_else(|| ApiError::internal("policy was not evaluated against a path id"))
    }
}

/// Parse the path id; anything but a UUID is a bad request
pub fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid user id"))
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: Policy,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 401 before anything about the target is looked at
        let caller = AuthenticatedUser::from_parts(parts)?;

        let target = if P::POLICY.needs_target() {
            let Path(raw) = Path::<String>::from_request_parts(parts, state)
                .await
                .map_err(|e| ApiError::internal(format!("path extraction failed: {}", e)))?;
            Some(parse_user_id(&raw)?)
        } else {
            None
        };

        authorize(P::POLICY, &caller, target)?;

        Ok(Self {
            caller,
            target,
            _policy: PhantomData,
        })
    }
}
