#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Restaurant and menu integration tests, driven through the real router.

use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;
use common::{TestApp, response_bytes, response_json};
use menumaster_kernel::store::Store;
use menumaster_test_utils::{item_body, menu_body, restaurant_body, test_owner};

/// Create a restaurant and return its JSON.
async fn create_restaurant(app: &TestApp, token: &str, name: &str) -> Value {
    let response = app
        .send("POST", "/restaurants", Some(restaurant_body(name)), Some(token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

/// Create a menu and return its JSON.
async fn create_menu(app: &TestApp, token: &str, restaurant_id: &str) -> Value {
    let response = app
        .send(
            "POST",
            "/menus",
            Some(menu_body("Dinner", restaurant_id)),
            Some(token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn owner_publishes_a_menu() {
    let app = TestApp::new();
    let token = app.signed_in(&test_owner()).await;

    let restaurant = create_restaurant(&app, &token, "Alice's Diner").await;
    let restaurant_id = restaurant["id"].as_str().unwrap();
    assert_eq!(restaurant["is_active"], true);

    let menu = create_menu(&app, &token, restaurant_id).await;
    let menu_id = menu["id"].as_str().unwrap();
    assert_eq!(menu["is_active"], false);
    assert_eq!(menu["restaurant_id"], restaurant_id);

    // Inactive menus stay out of the public listing
    let response = app.send("GET", "/menus", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!([]));

    let response = app
        .send(
            "POST",
            &format!("/menus/{menu_id}/categories"),
            Some(json!({ "name": "Starters" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(
            "POST",
            &format!("/menus/{menu_id}/items"),
            Some(item_body("Starters", "Soup", 12.5)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let menu = response_json(response).await;
    assert_eq!(menu["categories"][0]["items"][0]["name"], "Soup");
    assert_eq!(menu["categories"][0]["items"][0]["is_available"], true);

    let response = app
        .send(
            "PATCH",
            &format!("/restaurants/{restaurant_id}/menus/{menu_id}/status"),
            Some(json!({ "active": true })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["is_active"], true);

    let response = app.send("GET", "/menus", None, None).await;
    let public = response_json(response).await;
    assert_eq!(public.as_array().unwrap().len(), 1);
    assert_eq!(public[0]["id"], menu_id);
    assert_eq!(public[0]["categories"][0]["items"][0]["price"], 12.5);

    let response = app.send("GET", "/restaurants", None, None).await;
    let restaurants = response_json(response).await;
    assert_eq!(restaurants[0]["menu_ids"], json!([menu_id]));
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn empty_listings_are_no_content() {
    let app = TestApp::new();
    let token = app.signed_in(&test_owner()).await;

    for (uri, auth) in [
        ("/restaurants", None),
        ("/restaurants/mine", Some(token.as_str())),
        ("/menus/mine", Some(token.as_str())),
    ] {
        let response = app.send("GET", uri, None, auth).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
        assert!(response_bytes(response).await.is_empty());
    }
}

#[tokio::test]
async fn owners_only_see_their_own_resources() {
    let app = TestApp::new();
    let alice = app.signed_in(&test_owner()).await;
    let bob = app.signed_in(&test_owner()).await;

    let restaurant = create_restaurant(&app, &alice, "Alice's Diner").await;
    create_menu(&app, &alice, restaurant["id"].as_str().unwrap()).await;

    let response = app.send("GET", "/menus/mine", None, Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 1);

    let response = app.send("GET", "/menus/mine", None, Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .send("GET", "/restaurants/mine", None, Some(&bob))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn inactive_menu_is_readable_by_id() {
    let app = TestApp::new();
    let token = app.signed_in(&test_owner()).await;
    let restaurant = create_restaurant(&app, &token, "Diner").await;
    let menu = create_menu(&app, &token, restaurant["id"].as_str().unwrap()).await;
    let menu_id = menu["id"].as_str().unwrap();

    let response = app
        .send("GET", &format!("/menus/{menu_id}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["is_active"], false);

    let missing = uuid::Uuid::now_v7();
    let response = app
        .send("GET", &format!("/menus/{missing}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_and_bodies_are_json_errors() {
    let app = TestApp::new();
    let token = app.signed_in(&test_owner()).await;

    let response = app.send("GET", "/menus/not-a-uuid", None, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    menumaster_test_utils::assert::has_key(&response_json(response).await, "error");

    let response = app
        .send(
            "POST",
            "/restaurants",
            Some(json!({ "name": ["Diner"] })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    menumaster_test_utils::assert::has_key(&response_json(response).await, "error");
}

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
async fn other_owner_is_forbidden() {
    let app = TestApp::new();
    let alice = app.signed_in(&test_owner()).await;
    let bob = app.signed_in(&test_owner()).await;

    let restaurant = create_restaurant(&app, &alice, "Alice's Diner").await;
    let restaurant_id = restaurant["id"].as_str().unwrap();
    let menu = create_menu(&app, &alice, restaurant_id).await;
    let menu_id = menu["id"].as_str().unwrap();

    let response = app
        .send(
            "POST",
            &format!("/menus/{menu_id}/categories"),
            Some(json!({ "name": "Starters" })),
            Some(&bob),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send("DELETE", &format!("/menus/{menu_id}"), None, Some(&bob))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(
            "POST",
            "/menus",
            Some(menu_body("Bob's menu", restaurant_id)),
            Some(&bob),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Toggling someone else's menu looks exactly like a missing one
    let response = app
        .send(
            "PATCH",
            &format!("/restaurants/{restaurant_id}/menus/{menu_id}/status"),
            Some(json!({ "active": true })),
            Some(&bob),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_for_missing_category_is_not_found() {
    let app = TestApp::new();
    let token = app.signed_in(&test_owner()).await;
    let restaurant = create_restaurant(&app, &token, "Diner").await;
    let menu = create_menu(&app, &token, restaurant["id"].as_str().unwrap()).await;
    let menu_id = menu["id"].as_str().unwrap();

    let response = app
        .send(
            "POST",
            &format!("/menus/{menu_id}/items"),
            Some(item_body("Desserts", "Cake", 9.0)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send("GET", &format!("/menus/{menu_id}"), None, None)
        .await;
    assert_eq!(response_json(response).await["categories"], json!([]));
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::new();
    let token = app.signed_in(&test_owner()).await;
    let restaurant = create_restaurant(&app, &token, "Diner").await;
    let menu = create_menu(&app, &token, restaurant["id"].as_str().unwrap()).await;
    let menu_id = menu["id"].as_str().unwrap();

    app.send(
        "POST",
        &format!("/menus/{menu_id}/categories"),
        Some(json!({ "name": "Starters" })),
        Some(&token),
    )
    .await;

    let response = app
        .send(
            "POST",
            &format!("/menus/{menu_id}/items"),
            Some(item_body("Starters", "Soup", -1.0)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_menu_removes_it_everywhere() {
    let app = TestApp::new();
    let token = app.signed_in(&test_owner()).await;
    let restaurant = create_restaurant(&app, &token, "Diner").await;
    let menu = create_menu(&app, &token, restaurant["id"].as_str().unwrap()).await;
    let menu_id = menu["id"].as_str().unwrap();

    let response = app
        .send("DELETE", &format!("/menus/{menu_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["deleted"], true);

    let response = app
        .send("GET", &format!("/menus/{menu_id}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send("GET", "/restaurants/mine", None, Some(&token))
        .await;
    assert_eq!(response_json(response).await[0]["menu_ids"], json!([]));

    let response = app
        .send("DELETE", &format!("/menus/{menu_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unverified_owner_cannot_create() {
    let app = TestApp::new();
    let owner = test_owner();
    app.register(&owner).await;

    // Unverified users cannot log in, so mint a token directly
    let user = app
        .state
        .store()
        .find_user_by_email(&owner.email)
        .await
        .unwrap()
        .unwrap();
    let token = app
        .state
        .tokens()
        .issue(&user, chrono::Utc::now())
        .unwrap()
        .access_token;

    let response = app
        .send(
            "POST",
            "/restaurants",
            Some(restaurant_body("Diner")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    menumaster_test_utils::assert::error_contains(&response_json(response).await, "verify");
}
