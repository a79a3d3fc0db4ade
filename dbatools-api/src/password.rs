use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;

use crate::error::ApiError;

/// Hashing scheme identifier. Selected at process start; only argon2 is
/// implemented, but the identifier stays in config so a replacement
/// scheme can be rolled out with re-hash-on-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Argon2,
}

/// One-way credential hashing. Pure apart from salt generation; the
/// adaptive cost means callers on async paths should wrap calls in
/// `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct PasswordContext {
    scheme: Scheme,
}

impl PasswordContext {
    pub fn new(scheme: Scheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Hash with a fresh random salt. Two calls with the same input
    /// produce different digests.
    pub fn hash(&self, password: &str) -> Result<String, ApiError> {
        match self.scheme {
            Scheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|err| ApiError::Internal(format!("failed to hash password: {err}")))
            }
        }
    }

    /// True iff `password` produced `hash`. A malformed hash verifies as
    /// false rather than erroring, so callers cannot distinguish
    /// "malformed" from "mismatch".
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
