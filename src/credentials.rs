//! Argon2 credential hashing.
//!
//! The leaf collaborator that turns raw secrets into stored hashes and verifies
//! login attempts against them. No other module ever sees a raw password after
//! registration.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hashes a raw secret with a fresh random salt.
///
/// Returns `None` if hashing fails, which in practice only happens under OS RNG
/// failure; callers treat that as an internal error.
pub fn hash_password(password: &str) -> Option<String> {
    let salt = SaltString::generate(&mut OsRng);

    match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(hash) => Some(hash.to_string()),
        Err(e) => {
            tracing::error!("password hashing failed: {e}");
            None
        }
    }
}

/// Verifies a raw secret against a stored hash. Any parse or verification
/// failure is a plain `false`; the caller decides the user-facing message.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::error!("stored password hash is unparseable");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";

        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash));
        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_garbage_hash_rejects() {
        assert!(!verify_password("whatever", "not-a-phc-string"));
    }
}
