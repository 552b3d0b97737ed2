//! Restaurant model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Restaurant record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub image_url: Option<String>,
    pub owner_id: Uuid,
    /// Menus created for this restaurant, in creation order.
    pub menu_ids: Vec<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Restaurant {
    /// Check if `user_id` owns this restaurant.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Input for creating a restaurant.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRestaurant {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateRestaurant {
    /// Reject blank names and locations.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("restaurant name must not be empty".into()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("location must not be empty".into()));
        }
        Ok(())
    }

    /// Build the record for `owner_id`.
    pub fn into_restaurant(self, owner_id: Uuid) -> Restaurant {
        Restaurant {
            id: Uuid::now_v7(),
            name: self.name,
            location: self.location,
            image_url: self.image_url,
            owner_id,
            menu_ids: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_restaurants_are_active_and_empty() {
        let owner = Uuid::now_v7();
        let restaurant = CreateRestaurant {
            name: "Alice's Diner".into(),
            location: "Tel Aviv".into(),
            image_url: None,
        }
        .into_restaurant(owner);

        assert!(restaurant.is_active);
        assert!(restaurant.menu_ids.is_empty());
        assert!(restaurant.is_owned_by(owner));
        assert!(!restaurant.is_owned_by(Uuid::now_v7()));
    }

    #[test]
    fn blank_location_is_rejected() {
        let input = CreateRestaurant {
            name: "Diner".into(),
            location: "   ".into(),
            image_url: None,
        };
        assert!(matches!(input.validate(), Err(AppError::Validation(_))));
    }
}
