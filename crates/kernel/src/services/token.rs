//! Session token signing and validation (HS256 JWT).

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::User;

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Email at the time of issue.
    pub email: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// The single failure kind for token validation.
///
/// Bad signature, malformed payload, missing subject and expiry are not
/// distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Issued token handed back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Mints and validates signed session tokens.
///
/// There is no revocation list: a token stays valid for its whole lifetime.
/// Changing the secret invalidates every outstanding token.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service with HMAC-SHA256 signing.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for `user` valid from `now` for the configured lifetime.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<AccessToken> {
        let claims = TokenClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let access_token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
                .context("failed to encode access token")?;

        Ok(AccessToken {
            access_token,
            token_type: "bearer",
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Validate a token and return the user ID it was issued for.
    ///
    /// Expiry is checked against `now` rather than the wall clock.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, InvalidToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "rejected session token");
                InvalidToken
            })?;

        if data.claims.exp < now.timestamp() {
            debug!(sub = %data.claims.sub, "session token expired");
            return Err(InvalidToken);
        }

        data.claims.sub.parse::<Uuid>().map_err(|_| {
            debug!(sub = %data.claims.sub, "invalid user ID in token");
            InvalidToken
        })
    }
}
