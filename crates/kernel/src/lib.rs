//! MenuMaster Kernel Library
//!
//! This library exposes the kernel for integration testing.
//! The main entry point for running the server is the `menumaster` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use config::{AuthSettings, Config};
pub use error::{AppError, AppResult};
pub use state::AppState;
