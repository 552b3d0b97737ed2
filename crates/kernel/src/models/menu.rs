//! Menu model with embedded categories and items.
//!
//! Categories and items have no identity of their own: they live inside the
//! menu document and are addressed by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Menu record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Menu {
    pub id: Uuid,
    pub title: String,
    pub restaurant_id: Uuid,
    pub owner_id: Uuid,
    pub categories: Vec<Category>,
    /// Menus are hidden until their owner activates them.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A named group of items within a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// A single dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_available() -> bool {
    true
}

impl Menu {
    /// Create an empty, inactive menu.
    pub fn new(title: String, restaurant_id: Uuid, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            title,
            restaurant_id,
            owner_id,
            categories: Vec::new(),
            is_active: false,
            created_at: Utc::now(),
        }
    }

    /// Check if `user_id` owns this menu.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Append an empty category. Duplicate names are allowed.
    pub fn push_category(&mut self, name: String) {
        self.categories.push(Category {
            name,
            items: Vec::new(),
        });
    }

    /// First category whose name matches exactly.
    pub fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }
}

impl MenuItem {
    /// Reject blank names and negative or non-finite prices.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("item name must not be empty".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::Validation(
                "price must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

/// Input for creating a menu.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMenu {
    pub title: String,
    pub restaurant_id: Uuid,
}

/// Input for adding a category.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCategory {
    pub name: String,
}

/// Input for adding an item to a named category.
#[derive(Debug, Clone, Deserialize)]
pub struct AddItem {
    pub category_name: String,
    pub item: MenuItem,
}

/// Input for activating or hiding a menu.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetMenuStatus {
    pub active: bool,
}

/// Reject blank titles and category names.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
