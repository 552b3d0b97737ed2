//! MenuMaster test utilities.
//!
//! Request payload builders and JSON assertion helpers shared by the
//! integration tests.

use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

/// Short random suffix so fixtures never collide on unique columns.
pub fn unique_suffix() -> String {
    Uuid::now_v7().simple().to_string()[20..].to_string()
}

/// Create an owner registration with a unique username and email.
pub fn test_owner() -> TestAccount {
    let suffix = unique_suffix();
    TestAccount {
        username: format!("owner_{suffix}"),
        email: format!("owner_{suffix}@example.com"),
        password: "secret123".to_string(),
        role: "owner".to_string(),
    }
}

/// Create a customer registration with a unique username and email.
pub fn test_customer() -> TestAccount {
    let suffix = unique_suffix();
    TestAccount {
        username: format!("customer_{suffix}"),
        email: format!("customer_{suffix}@example.com"),
        password: "secret123".to_string(),
        role: "customer".to_string(),
    }
}

/// A registration payload builder.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl TestAccount {
    /// Set the username.
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    /// Set the email.
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// Body for `POST /auth/register`.
    pub fn register_body(&self) -> JsonValue {
        json!({
            "username": self.username,
            "email": self.email,
            "password": self.password,
            "role": self.role,
        })
    }

    /// Body for `POST /auth/login`.
    pub fn login_body(&self) -> JsonValue {
        json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

/// Body for `POST /restaurants`.
pub fn restaurant_body(name: &str) -> JsonValue {
    json!({
        "name": name,
        "location": "Tel Aviv",
        "image_url": null,
    })
}

/// Body for `POST /menus`.
pub fn menu_body(title: &str, restaurant_id: &str) -> JsonValue {
    json!({
        "title": title,
        "restaurant_id": restaurant_id,
    })
}

/// Body for `POST /menus/{id}/items`.
pub fn item_body(category_name: &str, name: &str, price: f64) -> JsonValue {
    json!({
        "category_name": category_name,
        "item": {
            "name": name,
            "description": null,
            "price": price,
        },
    })
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{}', got: {}",
            key,
            value
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON to NOT have key '{}', got: {}",
            key,
            value
        );
    }

    /// Assert that an error body carries a message containing `needle`.
    pub fn error_contains(value: &Value, needle: &str) {
        let message = value["error"].as_str().unwrap_or_default();
        assert!(
            message.contains(needle),
            "Expected error to contain '{}'\nActual: {}",
            needle,
            value
        );
    }
}
