pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use password::{hash_password, verify_password};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: Uuid, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(security.jwt_expiry_hours as i64)).timestamp();
        Self { id, iat: now.timestamp(), exp }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Password hashing error: {0}")]
    Hash(String),
}

pub fn generate_jwt(user_id: Uuid, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let claims = Claims::new(user_id, security);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// `Set-Cookie` value carrying the token. HttpOnly always, Secure when configured.
pub fn token_cookie(token: &str, security: &SecurityConfig) -> String {
    let max_age = security.jwt_cookie_expiry_days * 24 * 60 * 60;
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        TOKEN_COOKIE, token, max_age
    );
    if security.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Token from `Authorization: Bearer <token>` or, failing that, the `token` cookie.
pub fn extract_token(authorization: Option<&str>, cookie: Option<&str>) -> Option<String> {
    if let Some(token) = authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    cookie?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty() && *value != "none")
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn token_round_trip_keeps_user_id() {
        let security = AppConfig::test().security;
        let id = Uuid::new_v4();
        let token = generate_jwt(id, &security).unwrap();
        let claims = validate_jwt(&token, &security).unwrap();
        assert_eq!(claims.id, id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let security = AppConfig::test().security;
        let token = generate_jwt(Uuid::new_v4(), &security).unwrap();

        let other = SecurityConfig { jwt_secret: "another-secret".into(), ..security.clone() };
        assert!(matches!(validate_jwt(&token, &other), Err(AuthError::InvalidToken(_))));
        assert!(validate_jwt("not.a.jwt", &security).is_err());
    }

    #[test]
    fn missing_secret_refuses_to_sign() {
        let security = SecurityConfig { jwt_secret: String::new(), ..AppConfig::test().security };
        assert!(matches!(generate_jwt(Uuid::new_v4(), &security), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn cookie_flags_follow_config() {
        let mut security = AppConfig::test().security;
        let cookie = token_cookie("abc", &security);
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(!cookie.contains("Secure"));

        security.secure_cookies = true;
        assert!(token_cookie("abc", &security).ends_with("; Secure"));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        assert_eq!(extract_token(Some("Bearer abc"), Some("token=xyz")), Some("abc".into()));
        assert_eq!(extract_token(None, Some("theme=dark; token=xyz")), Some("xyz".into()));
        assert_eq!(extract_token(Some("Basic abc"), None), None);
        assert_eq!(extract_token(None, Some("token=none")), None);
    }
}
