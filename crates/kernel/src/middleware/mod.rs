//! HTTP request extractors.
//!
//! Provides the bearer-token authorization gate.

pub mod auth;

pub use auth::{
    AuthenticatedUser, Owner, VerifiedUser, authenticate, require_owner, require_verified,
};
