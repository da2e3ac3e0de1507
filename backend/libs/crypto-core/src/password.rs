/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

const MIN_PASSWORD_LEN: usize = 6;

/// Characters accepted in account passwords besides ASCII letters and digits
const ALLOWED_SPECIALS: &str = "@$=!:.#%";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password too weak: {0}")]
    Weak(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Hash a password using Argon2id
///
/// The password is checked against `validate_password_strength` first.
///
/// ## Returns
///
/// PHC-formatted hash string safe for database storage
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password_strength(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its hash
///
/// Returns `Ok(false)` on mismatch; errors are reserved for malformed hashes.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| PasswordError::Hash(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Validate password composition
///
/// ## Requirements
///
/// - Minimum 6 characters
/// - At least one digit, one lowercase and one uppercase letter
/// - Only ASCII letters, digits and `@$=!:.#%`
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::Weak(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if let Some(c) = password
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !ALLOWED_SPECIALS.contains(*c))
    {
        return Err(PasswordError::Weak(format!(
            "Password contains unsupported character '{}'",
            c
        )));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::Weak(
            "Password must contain at least one digit".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordError::Weak(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::Weak(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    Ok(())
}
