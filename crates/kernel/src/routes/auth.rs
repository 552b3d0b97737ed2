//! Account routes (register, verify, resend, login, me).

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::VerifiedUser;
use crate::models::{RegisterUser, UserProfile};
use crate::routes::extract::extract_json;
use crate::services::token::AccessToken;
use crate::services::verification::ResendOutcome;
use crate::state::AppState;

/// Email verification request body.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

/// Resend request body.
#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Register a new account.
///
/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterUser>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let input = extract_json(body)?;
    let user = state.accounts().register(input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// Confirm an email address with its code.
///
/// POST /auth/verify
async fn verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let input = extract_json(body)?;
    state
        .accounts()
        .verify_email(&input.email, &input.code, Utc::now())
        .await?;

    Ok(Json(MessageResponse {
        message: "email verified",
    }))
}

/// Send a fresh verification code.
///
/// POST /auth/resend
async fn resend(
    State(state): State<AppState>,
    body: Result<Json<ResendRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let input = extract_json(body)?;
    let message = match state
        .accounts()
        .resend_code(&input.email, Utc::now())
        .await?
    {
        ResendOutcome::NotFound => return Err(AppError::NotFound("user")),
        ResendOutcome::AlreadyVerified => "email already verified",
        ResendOutcome::Issued { .. } => "verification code sent",
    };

    Ok(Json(MessageResponse { message }))
}

/// Exchange credentials for a session token.
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AccessToken>> {
    let input = extract_json(body)?;
    let token = state
        .accounts()
        .login(&input.email, &input.password, Utc::now())
        .await?;
    Ok(Json(token))
}

/// Current user profile.
///
/// GET /auth/me
async fn me(VerifiedUser(user): VerifiedUser) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}

/// Create the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify", post(verify))
        .route("/auth/resend", post(resend))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}
