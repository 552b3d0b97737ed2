//! Persistence abstraction layer.
//!
//! All entity reads and writes go through [`Store`]. The services never see
//! SQL; they fetch a whole record, change it in memory, and save it back.
//! That read-modify-write is not atomic, so two concurrent writers to the
//! same menu can lose an update.
//!
//! Two implementations exist:
//!
//! - [`PgStore`] - PostgreSQL via sqlx; menu categories are one JSONB column.
//! - [`MemoryStore`] - in-process maps, used by tests and local development.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{Menu, Restaurant, User};

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Equality filter for menu listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuFilter {
    /// Only menus owned by this user.
    pub owner_id: Option<Uuid>,

    /// Only menus with this active flag.
    pub is_active: Option<bool>,
}

impl MenuFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by owner.
    pub fn with_owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Filter by active flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Check whether `menu` passes this filter.
    pub fn matches(&self, menu: &Menu) -> bool {
        self.owner_id.is_none_or(|id| menu.owner_id == id)
            && self.is_active.is_none_or(|active| menu.is_active == active)
    }
}

/// Document store for users, restaurants and menus.
///
/// Listings return records in creation order.
#[async_trait]
pub trait Store: Send + Sync {
    /// Find a user by ID.
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Find a user by email (exact match).
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Find a user by username (exact match).
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Insert a new user.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Overwrite an existing user record.
    async fn save_user(&self, user: &User) -> StoreResult<()>;

    /// Find a restaurant by ID.
    async fn find_restaurant(&self, id: Uuid) -> StoreResult<Option<Restaurant>>;

    /// List restaurants, optionally restricted to one owner.
    async fn list_restaurants(&self, owner_id: Option<Uuid>) -> StoreResult<Vec<Restaurant>>;

    /// Insert a new restaurant.
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()>;

    /// Overwrite an existing restaurant record.
    async fn save_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()>;

    /// Find a menu by ID.
    async fn find_menu(&self, id: Uuid) -> StoreResult<Option<Menu>>;

    /// List menus matching `filter`.
    async fn list_menus(&self, filter: MenuFilter) -> StoreResult<Vec<Menu>>;

    /// Insert a new menu.
    async fn insert_menu(&self, menu: &Menu) -> StoreResult<()>;

    /// Overwrite an existing menu document, categories included.
    async fn save_menu(&self, menu: &Menu) -> StoreResult<()>;

    /// Delete a menu. Returns `true` if a record was removed.
    async fn delete_menu(&self, id: Uuid) -> StoreResult<bool>;

    /// Check if the backing store is reachable.
    async fn is_healthy(&self) -> bool;
}
