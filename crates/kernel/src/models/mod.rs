//! Data models for the catalog.

pub mod menu;
pub mod restaurant;
pub mod user;

pub use menu::{AddCategory, AddItem, Category, CreateMenu, Menu, MenuItem, SetMenuStatus};
pub use restaurant::{CreateRestaurant, Restaurant};
pub use user::{RegisterUser, Role, User, UserProfile};
