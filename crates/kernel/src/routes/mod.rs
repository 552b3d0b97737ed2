//! HTTP route handlers.

pub mod auth;
pub mod extract;
pub mod health;
pub mod menu;
pub mod restaurant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Build the full application router without middleware layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(restaurant::router())
        .merge(menu::router())
}

/// Render a listing, or 204 No Content when it is empty.
pub(crate) fn list_or_no_content<T: Serialize>(items: Vec<T>) -> Response {
    if items.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(items).into_response()
}
