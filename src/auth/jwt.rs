use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::AuthError;
use crate::models::admins;

/// Claims carried by an admin session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The admin's UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Claims {
    /// Extract the admin UUID from the `sub` claim.
    pub fn admin_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }
}

/// Wrapper type to store the JWT signing settings in Actix app data.
#[derive(Clone)]
pub struct JwtSecret {
    pub secret: String,
    pub ttl: Duration,
}

impl JwtSecret {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

/// Sign an HS256 token for an admin. Returns the token and its expiry.
pub fn issue_token(
    admin: &admins::Model,
    jwt: &JwtSecret,
) -> Result<(String, DateTime<Utc>), AuthError> {
    let now = Utc::now();
    let expires_at = now
        + chrono::Duration::from_std(jwt.ttl)
            .map_err(|_| AuthError::Config("JWT lifetime out of range"))?;

    let claims = Claims {
        sub: admin.id.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: Some(now.timestamp() as usize),
        email: Some(admin.email.clone()),
        name: Some(admin.name.clone()),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok((token, expires_at))
}

/// Validate an HS256 token and return the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}
