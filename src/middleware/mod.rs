// Middleware and request extractors for the users API

pub mod access;
pub mod auth;
pub mod auth_middleware;
pub mod cors;
pub mod json_body;
pub mod validation;

pub use access::{authorize, AccessPolicy, AdminOnly, Authorized, OwnerOnly, OwnerOrAdmin};
pub use auth::AuthenticatedUser;
pub use auth_middleware::auth_middleware;
pub use cors::cors_layer;
pub use json_body::json_body_guard;
pub use validation::ValidatedJson;
