//! Password hashing and verification using Argon2
//!
//! Hashes are PHC strings carrying their own salt and parameters, so the rest
//! of the service treats them as opaque.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use postboard_core::{BoardError, BoardResult};

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> BoardResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BoardError::internal(format!("Failed to hash password: {e}"), "password"))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> BoardResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        BoardError::internal(format!("Invalid password hash format: {e}"), "password")
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pw").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pw", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("same-password").unwrap();
        let hash2 = hash_password("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1).unwrap());
        assert!(verify_password("same-password", &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(result.unwrap_err().status_code() == 500);
    }
}
