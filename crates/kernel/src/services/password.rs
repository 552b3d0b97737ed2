//! Password hashing with Argon2id.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::config::AuthSettings;

/// Salted, one-way password hashing.
///
/// The cost parameters apply to new hashes only; verification reads the
/// parameters embedded in the stored PHC string, so raising the cost does not
/// lock out existing accounts.
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    /// Create a hasher with the configured memory, iteration and parallelism cost.
    pub fn new(settings: &AuthSettings) -> Result<Self> {
        let params = Params::new(
            settings.hash_memory_kib,
            settings.hash_iterations,
            settings.hash_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("invalid password hash parameters: {e}"))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns `false` for a mismatch and for any empty or unparseable hash.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if hash.is_empty() {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
