//! Password storage for the admin account and back-office users.
//!
//! Stored values are Argon2id PHC strings: salt and cost parameters travel
//! with the hash, so a value from `ADMIN_PASSWORD_HASH` or a users record
//! verifies without any other configuration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use bizdir_core::error::CoreError;

/// Shortest password a user record may be given.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest password accepted before hashing.
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when `stored` is not a usable PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Whether `value` looks like a stored hash rather than a plaintext password.
pub fn is_phc_hash(value: &str) -> bool {
    PasswordHash::new(value).is_ok()
}

/// Check a password submitted for a users record.
pub fn check_new_password(password: &str) -> Result<(), CoreError> {
    if password.trim().is_empty() {
        return Err(CoreError::Validation("`password` cannot be blank".into()));
    }
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "`password` must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "`password` must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}
