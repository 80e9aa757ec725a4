//! Password hashing for registration and login.
//!
//! Argon2id with a per-password random salt, stored as a PHC string.
//! Verification is constant-time inside the argon2 crate.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hash a plaintext password into a PHC string.
pub fn hash(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
    Ok(hashed.to_string())
}

/// Verify a plaintext password against a stored PHC string.
/// An unparseable stored hash counts as a failed verification.
pub fn verify(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash("hunter22").expect("hash");
        assert!(hashed.starts_with("$argon2"));
        assert!(verify("hunter22", &hashed));
        assert!(!verify("hunter23", &hashed));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash("same-password").expect("hash");
        let b = hash("same-password").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_stored_hash_fails_closed() {
        assert!(!verify("anything", "not-a-phc-string"));
    }
}
