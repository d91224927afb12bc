// Session token claims

use serde::{Deserialize, Serialize};

/// Claims carried by the bearer token issued on login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// JWT ID (UUID format)
    pub jti: String,

    /// User email address
    pub email: String,

    /// Admin role flag
    pub admin: bool,

    /// Business account flag at the time of issue
    pub business: bool,

    pub aud: String,
    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}
