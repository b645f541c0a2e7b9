pub mod password;
pub mod validation;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;

pub use password::{hash_password, verify_password};

/// Token payload: the user id plus issue and expiry times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: i32, config: &AppConfig) -> Self {
        let now = Utc::now();
        Self {
            id,
            iat: now.timestamp(),
            exp: (now + config.jwt_expiry()).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no token provided")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("expired token")]
    ExpiredToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Sign a token for `user_id` with the configured lifetime
pub fn issue_token(config: &AppConfig, user_id: i32) -> Result<String, AuthError> {
    let secret = &config.security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let claims = Claims::new(user_id, config);
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, telling an expired token apart from a bad one
pub fn decode_token(config: &AppConfig, token: &str) -> Result<Claims, AuthError> {
    let secret = &config.security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "test-secret".into();
        config
    }

    #[test]
    fn issued_token_decodes_to_same_user() {
        let config = config();
        let token = issue_token(&config, 42).unwrap();
        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = config();
        let claims = Claims {
            id: 1,
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap();
        assert!(matches!(decode_token(&config, &token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let config = config();
        let mut other = config.clone();
        other.security.jwt_secret = "another-secret".into();
        let token = issue_token(&other, 1).unwrap();
        assert!(matches!(decode_token(&config, &token), Err(AuthError::InvalidToken)));
        assert!(matches!(decode_token(&config, "not.a.jwt"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let mut config = config();
        config.security.jwt_secret.clear();
        assert!(matches!(issue_token(&config, 1), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("Bearer   ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
