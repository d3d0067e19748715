// src/auth/password.rs
use crate::errors::ServerError;
use tracing::error;

/// Hash a password for storage.
pub fn hash_password(plain: &str) -> Result<String, ServerError> {
    hash_password_with_cost(plain, bcrypt::DEFAULT_COST)
}

/// Same, with an explicit cost. Tests use a low cost to stay fast.
pub fn hash_password_with_cost(plain: &str, cost: u32) -> Result<String, ServerError> {
    bcrypt::hash(plain, cost).map_err(|e| {
        error!("bcrypt hash failed: {e}");
        ServerError::Internal
    })
}

/// A malformed stored hash counts as a failed check, not an error.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}
