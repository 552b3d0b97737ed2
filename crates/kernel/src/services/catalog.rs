//! Restaurant and menu service with ownership checks.
//!
//! Every mutation loads the target record, checks that the caller owns it,
//! changes it in memory and saves the whole record back.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::menu::require_non_blank;
use crate::models::{CreateMenu, CreateRestaurant, Menu, MenuItem, Restaurant};
use crate::store::{MenuFilter, Store};

/// Catalog operations for owners and public browsing.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // -------------------------------------------------------------------------
    // Restaurants
    // -------------------------------------------------------------------------

    /// Create an active restaurant owned by `owner_id`.
    pub async fn create_restaurant(
        &self,
        input: CreateRestaurant,
        owner_id: Uuid,
    ) -> AppResult<Restaurant> {
        input.validate()?;

        let restaurant = input.into_restaurant(owner_id);
        self.store.insert_restaurant(&restaurant).await?;

        info!(restaurant_id = %restaurant.id, owner_id = %owner_id, "restaurant created");
        Ok(restaurant)
    }

    /// Restaurants owned by `owner_id`.
    pub async fn list_owner_restaurants(&self, owner_id: Uuid) -> AppResult<Vec<Restaurant>> {
        Ok(self.store.list_restaurants(Some(owner_id)).await?)
    }

    /// Every restaurant.
    pub async fn list_restaurants(&self) -> AppResult<Vec<Restaurant>> {
        Ok(self.store.list_restaurants(None).await?)
    }

    // -------------------------------------------------------------------------
    // Menus
    // -------------------------------------------------------------------------

    /// Create an empty, inactive menu for one of the caller's restaurants.
    pub async fn create_menu(&self, input: CreateMenu, owner_id: Uuid) -> AppResult<Menu> {
        require_non_blank("title", &input.title)?;

        let mut restaurant = self
            .store
            .find_restaurant(input.restaurant_id)
            .await?
            .ok_or(AppError::NotFound("restaurant"))?;

        if !restaurant.is_owned_by(owner_id) {
            warn!(
                restaurant_id = %restaurant.id,
                user_id = %owner_id,
                "menu creation refused for restaurant owned by another user"
            );
            return Err(AppError::Forbidden);
        }

        let menu = Menu::new(input.title, restaurant.id, owner_id);
        self.store.insert_menu(&menu).await?;

        restaurant.menu_ids.push(menu.id);
        self.store.save_restaurant(&restaurant).await?;

        info!(menu_id = %menu.id, restaurant_id = %restaurant.id, "menu created");
        Ok(menu)
    }

    /// Append an empty category. Duplicate names are kept.
    pub async fn add_category(
        &self,
        menu_id: Uuid,
        name: String,
        owner_id: Uuid,
    ) -> AppResult<Menu> {
        require_non_blank("category name", &name)?;

        let mut menu = self.load_owned_menu(menu_id, owner_id).await?;
        menu.push_category(name);
        self.store.save_menu(&menu).await?;

        Ok(menu)
    }

    /// Append `item` to the first category named exactly `category_name`.
    pub async fn add_item(
        &self,
        menu_id: Uuid,
        category_name: &str,
        item: MenuItem,
        owner_id: Uuid,
    ) -> AppResult<Menu> {
        item.validate()?;

        let mut menu = self.load_owned_menu(menu_id, owner_id).await?;
        let category = menu
            .category_mut(category_name)
            .ok_or(AppError::NotFound("category"))?;
        category.items.push(item);
        self.store.save_menu(&menu).await?;

        Ok(menu)
    }

    /// Delete a menu and unlink it from its restaurant.
    pub async fn delete_menu(&self, menu_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let menu = self.load_owned_menu(menu_id, owner_id).await?;

        let deleted = self.store.delete_menu(menu.id).await?;

        if let Some(mut restaurant) = self.store.find_restaurant(menu.restaurant_id).await? {
            let before = restaurant.menu_ids.len();
            restaurant.menu_ids.retain(|id| *id != menu.id);
            if restaurant.menu_ids.len() != before {
                self.store.save_restaurant(&restaurant).await?;
            }
        }

        info!(menu_id = %menu.id, "menu deleted");
        Ok(deleted)
    }

    /// Show or hide a menu.
    ///
    /// Returns `None` when the menu does not exist, belongs to another
    /// restaurant, or belongs to another owner. The three cases are not
    /// distinguished.
    pub async fn toggle_menu_status(
        &self,
        menu_id: Uuid,
        restaurant_id: Uuid,
        owner_id: Uuid,
        active: bool,
    ) -> AppResult<Option<Menu>> {
        let Some(mut menu) = self.store.find_menu(menu_id).await? else {
            return Ok(None);
        };
        if menu.restaurant_id != restaurant_id || !menu.is_owned_by(owner_id) {
            return Ok(None);
        }

        menu.is_active = active;
        self.store.save_menu(&menu).await?;

        info!(menu_id = %menu.id, active, "menu status changed");
        Ok(Some(menu))
    }

    /// Menus owned by `owner_id`, active or not.
    pub async fn list_owner_menus(&self, owner_id: Uuid) -> AppResult<Vec<Menu>> {
        Ok(self
            .store
            .list_menus(MenuFilter::new().with_owner(owner_id))
            .await?)
    }

    /// Menus visible to customers.
    pub async fn list_public_menus(&self) -> AppResult<Vec<Menu>> {
        Ok(self
            .store
            .list_menus(MenuFilter::new().with_active(true))
            .await?)
    }

    /// Any menu by ID, regardless of its active flag.
    pub async fn get_menu(&self, menu_id: Uuid) -> AppResult<Menu> {
        self.store
            .find_menu(menu_id)
            .await?
            .ok_or(AppError::NotFound("menu"))
    }

    async fn load_owned_menu(&self, menu_id: Uuid, owner_id: Uuid) -> AppResult<Menu> {
        let menu = self.get_menu(menu_id).await?;

        if !menu.is_owned_by(owner_id) {
            warn!(menu_id = %menu_id, user_id = %owner_id, "menu mutation by non-owner refused");
            return Err(AppError::Forbidden);
        }

        Ok(menu)
    }
}
