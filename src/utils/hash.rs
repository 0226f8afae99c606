use crate::error::AppError;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hashes an examinee/admin PIN with Argon2. PINs are short shared secrets,
/// so they are stored hashed exactly like passwords would be.
pub fn hash_pin(pin: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let pin_hash = argon2
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .to_string();

    Ok(pin_hash)
}

pub fn verify_pin(pin: &str, pin_hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(pin_hash).map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let result = Argon2::default().verify_password(pin.as_bytes(), &parsed_hash);

    match result {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}
