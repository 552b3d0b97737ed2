//! PostgreSQL implementation of [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::{MenuFilter, Store, StoreError, StoreResult};
use crate::models::{Category, Menu, Restaurant, User};

/// Store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    is_verified: bool,
    verification_code: Option<String>,
    code_expires_at: Option<DateTime<Utc>>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(StoreError::Corrupt)?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_verified: row.is_verified,
            verification_code: row.verification_code,
            code_expires_at: row.code_expires_at,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RestaurantRow {
    id: Uuid,
    name: String,
    location: String,
    image_url: Option<String>,
    owner_id: Uuid,
    menu_ids: Vec<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Restaurant {
            id: row.id,
            name: row.name,
            location: row.location,
            image_url: row.image_url,
            owner_id: row.owner_id,
            menu_ids: row.menu_ids,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: Uuid,
    title: String,
    restaurant_id: Uuid,
    owner_id: Uuid,
    categories: Json<Vec<Category>>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            title: row.title,
            restaurant_id: row.restaurant_id,
            owner_id: row.owner_id,
            categories: row.categories.0,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Translate unique-index violations into [`StoreError::Conflict`].
fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.constraint().unwrap_or("unique").to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_verified,
                               verification_code, code_expires_at, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(&user.verification_code)
        .bind(user.code_expires_at)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, is_verified = $5,
                verification_code = $6, code_expires_at = $7, role = $8
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(&user.verification_code)
        .bind(user.code_expires_at)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn find_restaurant(&self, id: Uuid) -> StoreResult<Option<Restaurant>> {
        let row = sqlx::query_as::<_, RestaurantRow>("SELECT * FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Restaurant::from))
    }

    async fn list_restaurants(&self, owner_id: Option<Uuid>) -> StoreResult<Vec<Restaurant>> {
        let rows = sqlx::query_as::<_, RestaurantRow>(
            r#"
            SELECT * FROM restaurants
            WHERE ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    async fn insert_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO restaurants (id, name, location, image_url, owner_id,
                                     menu_ids, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(restaurant.id)
        .bind(&restaurant.name)
        .bind(&restaurant.location)
        .bind(&restaurant.image_url)
        .bind(restaurant.owner_id)
        .bind(&restaurant.menu_ids)
        .bind(restaurant.is_active)
        .bind(restaurant.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn save_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE restaurants
            SET name = $2, location = $3, image_url = $4, owner_id = $5,
                menu_ids = $6, is_active = $7
            WHERE id = $1
            "#,
        )
        .bind(restaurant.id)
        .bind(&restaurant.name)
        .bind(&restaurant.location)
        .bind(&restaurant.image_url)
        .bind(restaurant.owner_id)
        .bind(&restaurant.menu_ids)
        .bind(restaurant.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_menu(&self, id: Uuid) -> StoreResult<Option<Menu>> {
        let row = sqlx::query_as::<_, MenuRow>("SELECT * FROM menus WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Menu::from))
    }

    async fn list_menus(&self, filter: MenuFilter) -> StoreResult<Vec<Menu>> {
        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT * FROM menus
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::boolean IS NULL OR is_active = $2)
            ORDER BY created_at, id
            "#,
        )
        .bind(filter.owner_id)
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Menu::from).collect())
    }

    async fn insert_menu(&self, menu: &Menu) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO menus (id, title, restaurant_id, owner_id, categories,
                               is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(menu.id)
        .bind(&menu.title)
        .bind(menu.restaurant_id)
        .bind(menu.owner_id)
        .bind(Json(&menu.categories))
        .bind(menu.is_active)
        .bind(menu.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn save_menu(&self, menu: &Menu) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE menus
            SET title = $2, restaurant_id = $3, owner_id = $4, categories = $5,
                is_active = $6
            WHERE id = $1
            "#,
        )
        .bind(menu.id)
        .bind(&menu.title)
        .bind(menu.restaurant_id)
        .bind(menu.owner_id)
        .bind(Json(&menu.categories))
        .bind(menu.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_menu(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_healthy(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}
