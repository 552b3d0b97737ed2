//! Menu routes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::Owner;
use crate::models::{AddCategory, AddItem, CreateMenu, Menu};
use crate::routes::extract::{extract_json, extract_path};
use crate::routes::list_or_no_content;
use crate::state::AppState;

/// Delete acknowledgement.
#[derive(Debug, Serialize)]
struct DeleteResponse {
    deleted: bool,
}

/// List active menus.
///
/// GET /menus
async fn public_menus(State(state): State<AppState>) -> AppResult<Json<Vec<Menu>>> {
    Ok(Json(state.catalog().list_public_menus().await?))
}

/// Create a menu for one of the caller's restaurants.
///
/// POST /menus
async fn create_menu(
    State(state): State<AppState>,
    Owner(owner): Owner,
    body: Result<Json<CreateMenu>, JsonRejection>,
) -> AppResult<Response> {
    let input = extract_json(body)?;
    let menu = state.catalog().create_menu(input, owner.id).await?;
    Ok((StatusCode::CREATED, Json(menu)).into_response())
}

/// List the caller's menus, active or not.
///
/// GET /menus/mine
async fn my_menus(State(state): State<AppState>, Owner(owner): Owner) -> AppResult<Response> {
    let menus = state.catalog().list_owner_menus(owner.id).await?;
    Ok(list_or_no_content(menus))
}

/// GET /menus/{menu_id}
async fn get_menu(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Menu>> {
    let menu_id = extract_path(path)?;
    Ok(Json(state.catalog().get_menu(menu_id).await?))
}

/// DELETE /menus/{menu_id}
async fn delete_menu(
    State(state): State<AppState>,
    Owner(owner): Owner,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<DeleteResponse>> {
    let menu_id = extract_path(path)?;
    let deleted = state.catalog().delete_menu(menu_id, owner.id).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// POST /menus/{menu_id}/categories
async fn add_category(
    State(state): State<AppState>,
    Owner(owner): Owner,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<AddCategory>, JsonRejection>,
) -> AppResult<Json<Menu>> {
    let menu_id = extract_path(path)?;
    let input = extract_json(body)?;
    let menu = state
        .catalog()
        .add_category(menu_id, input.name, owner.id)
        .await?;
    Ok(Json(menu))
}

/// POST /menus/{menu_id}/items
async fn add_item(
    State(state): State<AppState>,
    Owner(owner): Owner,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<AddItem>, JsonRejection>,
) -> AppResult<Json<Menu>> {
    let menu_id = extract_path(path)?;
    let input = extract_json(body)?;
    let menu = state
        .catalog()
        .add_item(menu_id, &input.category_name, input.item, owner.id)
        .await?;
    Ok(Json(menu))
}

/// Create the menu router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menus", get(public_menus).post(create_menu))
        .route("/menus/mine", get(my_menus))
        .route("/menus/{menu_id}", get(get_menu).delete(delete_menu))
        .route("/menus/{menu_id}/categories", post(add_category))
        .route("/menus/{menu_id}/items", post(add_item))
}
