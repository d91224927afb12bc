// JWT Token Service
// HS256 bearer tokens carrying identity and role claims. Stateless: nothing
// about issued tokens is stored server-side.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AccessTokenClaims, User};

// Error types for JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(String),

    #[error("Clock error: {0}")]
    ClockError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::InvalidToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub token_expiry: u64, // seconds
    pub algorithm: Algorithm,
    pub audience: String,
    pub issuer: String,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
    pub key_version: u32,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("token_expiry", &self.token_expiry)
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .field("key_version", &self.key_version)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(
        secret: &str,
        token_expiry: u64,
        audience: impl Into<String>,
        issuer: impl Into<String>,
        key_version: u32,
    ) -> Self {
        JwtConfig {
            token_expiry,
            algorithm: Algorithm::HS256,
            audience: audience.into(),
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            key_version,
        }
    }

    /// Create JWT config from centralized app configuration
    pub fn from_app_config(config: &crate::app_config::AppConfig) -> Self {
        let crate::app_config::JwtConfig {
            secret,
            expiry,
            audience,
            issuer,
            key_version,
        } = &config.jwt;

        Self::new(secret, *expiry, audience.clone(), issuer.clone(), *key_version)
    }
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Issue a token for a stored user
    pub fn issue_for(&self, user: &User) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::ClockError(e.to_string()))?
            .as_secs();

        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            admin: user.is_admin,
            business: user.is_business,
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
            iat: now,
            exp: now + self.config.token_expiry,
        };

        let mut header = Header::new(self.config.algorithm);
        header.kid = Some(self.config.key_version.to_string());

        encode(&header, &claims, &self.config.encoding_key).map_err(Into::into)
    }

    /// Verify signature, audience, issuer and expiry
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<AccessTokenClaims>(token, &self.config.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, RegisterRequest};
    use serde_json::json;

    const SECRET: &str = "test-secret-hs256-minimum-32-characters-long";

    fn test_user(is_admin: bool) -> User {
        let request: RegisterRequest =
            serde_json::from_value(json!({"email": "a@b.com", "password": "secret1"})).unwrap();
        let mut user = NewUser::from_registration(request, "hash".to_string()).into_user();
        user.is_admin = is_admin;
        user
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = JwtService::new(JwtConfig::new(SECRET, 3600, "test", "test", 1));
        let user = test_user(true);

        let token = service.issue_for(&user).expect("token");
        let claims = service.validate_token(&token).expect("claims");

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.admin);
        assert!(!claims.business);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new(JwtConfig::new(SECRET, 3600, "test", "test", 1));
        let verifier = JwtService::new(JwtConfig::new(
            "another-secret-hs256-minimum-32-characters",
            3600,
            "test",
            "test",
            1,
        ));

        let token = issuer.issue_for(&test_user(false)).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let issuer = JwtService::new(JwtConfig::new(SECRET, 3600, "other-app", "test", 1));
        let verifier = JwtService::new(JwtConfig::new(SECRET, 3600, "test", "test", 1));

        let token = issuer.issue_for(&test_user(false)).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new(JwtConfig::new(SECRET, 3600, "test", "test", 1));
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = AccessTokenClaims {
            sub: Uuid::new_v4().to_string(),
            jti: Uuid::new_v4().to_string(),
            email: "a@b.com".to_string(),
            admin: false,
            business: false,
            aud: "test".to_string(),
            iss: "test".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = JwtService::new(JwtConfig::new(SECRET, 3600, "test", "test", 1));
        assert!(service.validate_token("not.a.jwt").is_err());
    }
}
