//! Stateless bearer tokens (HS256 JWT).
//!
//! Tokens carry the user id and email of the caller. There is no server-side
//! session table: a token is valid as long as its signature checks out and
//! it has not expired.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token lifetime of `days` days. Fails when `days` is not positive or
/// does not fit a `Duration`.
pub fn validity_days(days: i64) -> Result<Duration> {
    if days <= 0 {
        bail!("Token validity must be a positive number of days");
    }
    Duration::try_days(days).with_context(|| format!("{} days is out of range", days))
}

pub fn issue_token(secret: &str, user_id: &str, email: &str, valid_for: Duration) -> Result<String> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(valid_for)
        .context("Token expiry is out of range")?;
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to sign token")
}

pub fn validate_token(secret: &str, token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .context("Invalid token")?;
    Ok(data.claims)
}
