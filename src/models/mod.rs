pub mod auth;
pub mod user;

// Re-export common types
pub use auth::AccessTokenClaims;
pub use user::{
    normalize_email, LoginRequest, NewUser, PublicUser, RegisterRequest, User, UserChanges,
};
