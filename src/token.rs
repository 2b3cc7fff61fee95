//! Token minting and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::AuthError;
use crate::settings::Settings;

/// Token kind, carried inside the signed payload so one kind can never
/// be replayed as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived, stateless, no jti.
    Access,
    /// Long-lived, carries a jti for deployment-side tracking.
    Refresh,
}

/// Signed claims shared by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id rendered as a string).
    pub sub: String,
    /// Token kind.
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp).
    pub iat: u64,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
    /// Token id, present on refresh tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Result of issuing or refreshing a session.
///
/// `refresh` is `None` when a refresh is served with rotation disabled;
/// the client keeps using its still-valid refresh token.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: Option<String>,
}

fn unix_now() -> Result<u64, AuthError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| AuthError::internal("System time before Unix epoch"))
}

fn sign(settings: &Settings, claims: &Claims) -> Result<String, AuthError> {
    jsonwebtoken::encode(
        &Header::new(settings.algorithm()),
        claims,
        &EncodingKey::from_secret(settings.secret()),
    )
    .map_err(|e| {
        tracing::error!("token signing failed: {}", e);
        AuthError::internal("Token signing failed")
    })
}

/// Mint an access token for a subject.
pub fn create_access_token(settings: &Settings, subject: &str) -> Result<String, AuthError> {
    let now = unix_now()?;
    let claims = Claims {
        sub: subject.to_string(),
        token_type: TokenType::Access,
        iat: now,
        exp: now + settings.access_minutes() * 60,
        jti: None,
    };
    sign(settings, &claims)
}

/// Mint a refresh token for a subject.
///
/// The caller supplies the jti; issuance policy (fresh randomness per
/// token) lives in the service layer, not here.
pub fn create_refresh_token(
    settings: &Settings,
    subject: &str,
    jti: &str,
) -> Result<String, AuthError> {
    let now = unix_now()?;
    let claims = Claims {
        sub: subject.to_string(),
        token_type: TokenType::Refresh,
        iat: now,
        exp: now + settings.refresh_days() * 86_400,
        jti: Some(jti.to_string()),
    };
    sign(settings, &claims)
}

fn decode(settings: &Settings, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
    let message = match expected {
        TokenType::Access => "Invalid access token",
        TokenType::Refresh => "Invalid refresh token",
    };

    let mut validation = Validation::new(settings.algorithm());
    validation.leeway = 0;

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret()),
        &validation,
    )
    .map_err(|e| {
        debug!("token rejected: {}", e);
        AuthError::unauthorized(message)
    })?;

    if token_data.claims.token_type != expected {
        debug!("token rejected: wrong token type");
        return Err(AuthError::unauthorized(message));
    }

    Ok(token_data.claims)
}

/// Validate an access token and return its claims.
///
/// Bad signature, expiry, and wrong kind all collapse into the same
/// `Unauthorized`; the cause is visible only at debug level.
pub fn decode_access(settings: &Settings, token: &str) -> Result<Claims, AuthError> {
    decode(settings, token, TokenType::Access)
}

/// Validate a refresh token and return its claims.
pub fn decode_refresh(settings: &Settings, token: &str) -> Result<Claims, AuthError> {
    decode(settings, token, TokenType::Refresh)
}
