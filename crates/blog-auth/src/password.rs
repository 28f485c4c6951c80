//! Password hashing with Argon2id.
//!
//! Production hashing always uses the algorithm's default cost
//! (m=19456 KiB, t=2, p=1). The work factor is meant to be expensive.

use crate::error::AuthError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Salted, adaptive one-way password hasher.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Hasher with the Argon2 default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with explicit parameters.
    ///
    /// Only meant for tests that need cheap hashes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` if the parameters are out of range.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Hashing(format!("Invalid parameters: {e}")))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password into a PHC string with an embedded random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` only on internal failure; the content of
    /// `password` never causes an error.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a PHC hash.
    ///
    /// Parameters are read from the hash itself, so digests produced with
    /// other cost settings still verify. The digest comparison is constant
    /// time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidHashFormat` if `hash` is not a PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidHashFormat)?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::InvalidHashFormat),
        }
    }
}
