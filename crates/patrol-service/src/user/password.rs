use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Hashes a password using Argon2id with a random salt.
///
/// ## Errors
/// Returns an error if password hashing fails.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to hash password: {e}")))?;

    Ok(password_hash.to_string())
}

#[cfg(test)]
mod tests {
    use argon2::{PasswordHash, PasswordVerifier};

    use super::*;

    #[test_log::test]
    fn test_hash_round_trips_with_argon2() {
        let password = "test_password_123";
        let hash = hash_password(password).expect("Failed to hash password");

        let parsed = PasswordHash::new(&hash).expect("Hash is not a valid PHC string");
        assert!(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong_password", &parsed)
                .is_err()
        );
    }

    #[test_log::test]
    fn test_hash_generates_different_salts() {
        let password = "same_password";
        let hash1 = hash_password(password).expect("Failed to hash password");
        let hash2 = hash_password(password).expect("Failed to hash password");

        // Hashes should be different due to different salts
        assert_ne!(hash1, hash2);
    }

    #[test_log::test]
    fn test_hash_is_phc_encoded_argon2() {
        let hash = hash_password("password").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2"));
    }
}
