//! Application services.
//!
//! Leaf services (passwords, verification codes, tokens, email) hold no
//! storage handle. [`account::AccountService`] and
//! [`catalog::CatalogService`] orchestrate them over the [`crate::store::Store`].

pub mod account;
pub mod catalog;
pub mod email;
pub mod password;
pub mod token;
pub mod verification;
