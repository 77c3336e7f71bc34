//! JWT identity for the requesting user.
//!
//! A token's `sub` claim is the username of the actor. Tokens are read from
//! the `Authorization: Bearer` header first, then from the session cookie.
//! Credential checking and login pages are not part of this crate; tokens
//! are issued by operator tooling (`fare token`).

use cookie::Cookie;
use hyper::http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::{Auth as AuthConfig, MIN_SECRET_LENGTH};
use crate::error::{Error, Result};

fn validate_secret(config: &AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(Error::Config(format!(
            "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Create a JWT token for a user.
///
/// # Arguments
/// * `config` - Auth configuration with JWT secret and expiry settings
/// * `username` - The username to encode in the token's `sub` claim
pub fn create_token(config: &AuthConfig, username: &str) -> Result<String> {
    validate_secret(config)?;
    let now = jiff::Timestamp::now();
    let hours = config.token_expiry_days as i64 * 24;
    let exp = now + jiff::Span::new().hours(hours);

    let claims = Claims {
        sub: username.to_string(),
        exp: exp.as_second(),
        iat: now.as_second(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token creation failed: {e}")))?;

    Ok(token)
}

/// Verify and decode a JWT token.
///
/// # Returns
/// - `Ok(Claims)` if the token is valid
/// - `Err(Error::TokenExpired)` if the token has expired
/// - `Err(Error::Unauthorized)` for any other validation failure
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    validate_secret(config)?;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::Unauthorized,
    })?;

    Ok(token_data.claims)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get("Authorization")?.to_str().ok()?;
    auth_header
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("bearer "))
        .map(|_| &auth_header[7..])
}

/// Value of the named cookie, with RFC 6265 quoting removed.
fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(hyper::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|c| c.ok())
        .find(|c| c.name() == cookie_name)
        .map(|c| c.value_trimmed().to_string())
}

/// Extract the actor's username from the request headers.
///
/// # Returns
/// - `Ok(username)` if a valid token is present
/// - `Err(Error::Unauthorized)` if no token is present or it is invalid
pub fn extract_username(headers: &HeaderMap, config: &AuthConfig) -> Result<String> {
    let token = bearer_token(headers)
        .map(str::to_string)
        .or_else(|| cookie_token(headers, &config.cookie_name))
        .ok_or(Error::Unauthorized)?;

    let claims = verify_token(config, &token)?;

    Ok(claims.sub)
}
