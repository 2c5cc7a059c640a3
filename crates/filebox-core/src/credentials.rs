//! Password hashing and client key generation
//!
//! Passwords are stored as Argon2id PHC strings with a random 16-byte salt.
//! Client keys are 32 bytes from the operating system CSPRNG, hex encoded.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::{Error, Result};

const SALT_LEN: usize = 16;
const CLIENT_KEY_LEN: usize = 32;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt_bytes).map_err(Error::credentials)?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(Error::credentials)?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(Error::credentials)?
        .to_string();
    Ok(phc)
}

/// Check `password` against a PHC string produced by [`hash_password`].
///
/// Returns `Ok(false)` on a wrong password and an error when `hash` is not a
/// valid PHC string.
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(Error::credentials)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::credentials(e)),
    }
}

/// Generate a session key for a newly registered client.
pub fn generate_client_key() -> Result<String> {
    let mut key = [0u8; CLIENT_KEY_LEN];
    getrandom::getrandom(&mut key).map_err(Error::credentials)?;
    Ok(hex::encode(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        let err = verify_password("not-a-phc-string", "pw").unwrap_err();
        assert!(matches!(err, Error::Credentials { .. }));
    }

    #[test]
    fn client_keys_are_random_hex() {
        let a = generate_client_key().unwrap();
        let b = generate_client_key().unwrap();

        assert_eq!(a.len(), CLIENT_KEY_LEN * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
