//! In-process implementation of [`Store`].
//!
//! Records are kept in insertion order behind a single `parking_lot::RwLock`.
//! Unique constraints on user email and username are enforced on insert so
//! the behaviour matches the PostgreSQL schema.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{MenuFilter, Store, StoreError, StoreResult};
use crate::models::{Menu, Restaurant, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    restaurants: Vec<Restaurant>,
    menus: Vec<Menu>,
}

/// Memory-backed store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Replace the record with the same id, or append it.
fn upsert<T>(rows: &mut Vec<T>, row: &T, id_of: impl Fn(&T) -> Uuid)
where
    T: Clone,
{
    let id = id_of(row);
    match rows.iter_mut().find(|r| id_of(r) == id) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users.email".to_string()));
        }
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("users.username".to_string()));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        upsert(&mut self.tables.write().users, user, |u| u.id);
        Ok(())
    }

    async fn find_restaurant(&self, id: Uuid) -> StoreResult<Option<Restaurant>> {
        Ok(self
            .tables
            .read()
            .restaurants
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_restaurants(&self, owner_id: Option<Uuid>) -> StoreResult<Vec<Restaurant>> {
        Ok(self
            .tables
            .read()
            .restaurants
            .iter()
            .filter(|r| owner_id.is_none_or(|id| r.owner_id == id))
            .cloned()
            .collect())
    }

    async fn insert_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        self.tables.write().restaurants.push(restaurant.clone());
        Ok(())
    }

    async fn save_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        upsert(&mut self.tables.write().restaurants, restaurant, |r| r.id);
        Ok(())
    }

    async fn find_menu(&self, id: Uuid) -> StoreResult<Option<Menu>> {
        Ok(self.tables.read().menus.iter().find(|m| m.id == id).cloned())
    }

    async fn list_menus(&self, filter: MenuFilter) -> StoreResult<Vec<Menu>> {
        Ok(self
            .tables
            .read()
            .menus
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn insert_menu(&self, menu: &Menu) -> StoreResult<()> {
        self.tables.write().menus.push(menu.clone());
        Ok(())
    }

    async fn save_menu(&self, menu: &Menu) -> StoreResult<()> {
        upsert(&mut self.tables.write().menus, menu, |m| m.id);
        Ok(())
    }

    async fn delete_menu(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.menus.len();
        tables.menus.retain(|m| m.id != id);
        Ok(tables.menus.len() < before)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
