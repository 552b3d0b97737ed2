//! Layered authorization gate.
//!
//! Three gates run in order, each consuming the previous identity:
//! [`authenticate`] turns a bearer token into an [`AuthenticatedUser`],
//! [`require_verified`] into a [`VerifiedUser`], and [`require_owner`] into
//! an [`Owner`]. Handlers ask for the identity they need as an extractor and
//! the earlier gates run implicitly.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::services::token::TokenService;
use crate::state::AppState;
use crate::store::Store;

/// A user whose session token is valid.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// An authenticated user with a verified email address.
#[derive(Debug, Clone)]
pub struct VerifiedUser(pub User);

/// A verified user holding the owner role.
#[derive(Debug, Clone)]
pub struct Owner(pub User);

/// Resolve a bearer token to its user.
///
/// A missing token, a token that fails validation, and a token whose
/// subject no longer exists all fail the same way. Storage failures are
/// reported as such.
pub async fn authenticate(
    tokens: &TokenService,
    store: &dyn Store,
    bearer: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<AuthenticatedUser> {
    let token = bearer.ok_or(AppError::Unauthenticated)?;
    let user_id = tokens
        .validate(token, now)
        .map_err(|_| AppError::Unauthenticated)?;

    match store.find_user(user_id).await? {
        Some(user) => Ok(AuthenticatedUser(user)),
        None => {
            debug!(user_id = %user_id, "token subject no longer exists");
            Err(AppError::Unauthenticated)
        }
    }
}

/// Require a verified email address.
pub fn require_verified(user: AuthenticatedUser) -> AppResult<VerifiedUser> {
    if !user.0.is_verified {
        return Err(AppError::EmailNotVerified);
    }
    Ok(VerifiedUser(user.0))
}

/// Require the owner role.
pub fn require_owner(user: VerifiedUser) -> AppResult<Owner> {
    if !user.0.is_owner() {
        return Err(AppError::InsufficientRole);
    }
    Ok(Owner(user.0))
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(
            state.tokens(),
            state.store().as_ref(),
            bearer_token(parts),
            Utc::now(),
        )
        .await
    }
}

impl FromRequestParts<AppState> for VerifiedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        require_verified(user)
    }
}

impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = VerifiedUser::from_request_parts(parts, state).await?;
        require_owner(user)
    }
}
