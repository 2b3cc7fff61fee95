//! Password hashing.
//!
//! Argon2id with a per-password random salt, stored as a PHC string.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AuthError;

/// Hash a plaintext password.
///
/// Returns a PHC string (`$argon2id$...`) embedding the salt and
/// parameters, suitable for storage as-is.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            AuthError::internal("Password hashing failed")
        })?;

    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC string.
///
/// An unparseable stored hash counts as a mismatch; callers get one
/// uniform answer for every kind of failure.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
