//! Restaurant routes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::Owner;
use crate::models::{CreateRestaurant, Menu, SetMenuStatus};
use crate::routes::extract::{extract_json, extract_path};
use crate::routes::list_or_no_content;
use crate::state::AppState;

/// List every restaurant.
///
/// GET /restaurants
async fn list_restaurants(State(state): State<AppState>) -> AppResult<Response> {
    let restaurants = state.catalog().list_restaurants().await?;
    Ok(list_or_no_content(restaurants))
}

/// Create a restaurant for the caller.
///
/// POST /restaurants
async fn create_restaurant(
    State(state): State<AppState>,
    Owner(owner): Owner,
    body: Result<Json<CreateRestaurant>, JsonRejection>,
) -> AppResult<Response> {
    let input = extract_json(body)?;
    let restaurant = state.catalog().create_restaurant(input, owner.id).await?;
    Ok((StatusCode::CREATED, Json(restaurant)).into_response())
}

/// List the caller's restaurants.
///
/// GET /restaurants/mine
async fn my_restaurants(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> AppResult<Response> {
    let restaurants = state.catalog().list_owner_restaurants(owner.id).await?;
    Ok(list_or_no_content(restaurants))
}

/// Show or hide one of the caller's menus.
///
/// PATCH /restaurants/{restaurant_id}/menus/{menu_id}/status
async fn set_menu_status(
    State(state): State<AppState>,
    Owner(owner): Owner,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    body: Result<Json<SetMenuStatus>, JsonRejection>,
) -> AppResult<Json<Menu>> {
    let (restaurant_id, menu_id) = extract_path(path)?;
    let input = extract_json(body)?;
    state
        .catalog()
        .toggle_menu_status(menu_id, restaurant_id, owner.id, input.active)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("menu"))
}

/// Create the restaurant router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route("/restaurants/mine", get(my_restaurants))
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}/status",
            patch(set_menu_status),
        )
}
