use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{AppError, AppResult};

const PHC_PREFIX: &str = "$argon2";

pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Storage(format!("password hashing failed: {e}")))
}

/// Checks a supplied password against the stored credential, which is either
/// an argon2 PHC string or a legacy plaintext value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored.starts_with(PHC_PREFIX) {
        return match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        };
    }

    // plaintext credential
    password == stored
}
