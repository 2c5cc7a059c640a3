//! User and client account records
//!
//! Records are built and checked here but not stored: persisting accounts
//! and looking a user up by email belong to the authentication layer.

use serde::{Deserialize, Serialize};

use super::OwnerId;
use crate::credentials;
use crate::{Error, Result};

/// An account owning a file namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub id: OwnerId,
    pub email: String,
    /// Argon2 PHC string
    pub hashed_password: String,
}

impl User {
    pub fn new(id: OwnerId, email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            hashed_password: hashed_password.into(),
        }
    }

    /// Create a user whose password is stored as a salted Argon2 hash.
    pub fn register(id: OwnerId, email: impl Into<String>, password: &str) -> Result<Self> {
        let hashed_password = credentials::hash_password(password)?;
        Ok(Self::new(id, email, hashed_password))
    }

    /// Check `password` against the stored hash.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCredentials`] when the password does not match.
    pub fn verify_password(&self, password: &str) -> Result<()> {
        if credentials::verify_password(&self.hashed_password, password)? {
            Ok(())
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}

/// One device syncing on behalf of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Client {
    pub id: u64,
    pub user_id: OwnerId,
    pub session_key: String,
}

impl Client {
    /// Register a client for `user` with a freshly generated session key.
    pub fn issue(id: u64, user: &User) -> Result<Self> {
        Ok(Self {
            id,
            user_id: user.id,
            session_key: credentials::generate_client_key()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_user_verifies_own_password_only() {
        let user = User::register(1, "owner@example.com", "pw").unwrap();

        assert_ne!(user.hashed_password, "pw");
        assert!(user.verify_password("pw").is_ok());
        assert!(matches!(user.verify_password("nope"), Err(Error::InvalidCredentials)));
    }

    #[test]
    fn issued_clients_belong_to_user_with_distinct_keys() {
        let user = User::new(9, "owner@example.com", "");
        let a = Client::issue(1, &user).unwrap();
        let b = Client::issue(2, &user).unwrap();

        assert_eq!((a.user_id, b.user_id), (9, 9));
        assert_eq!(a.session_key.len(), 64);
        assert_ne!(a.session_key, b.session_key);
    }
}
