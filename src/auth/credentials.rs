//! Credential store — username → Argon2 hash records, seeded at bootstrap
//! and immutable afterwards.

use std::collections::HashMap;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use super::Identity;
use crate::config::AccountConfig;

/// Dev fixture account, seeded when no accounts are configured.
pub const DEV_USERNAME: &str = "testuser";
pub const DEV_PASSWORD: &str = "password123";

pub struct CredentialStore {
    users: HashMap<String, String>,
    /// Verified for unknown usernames so a lookup miss costs the same as a
    /// password mismatch.
    dummy_hash: String,
}

impl CredentialStore {
    pub fn new(accounts: impl IntoIterator<Item = (String, String)>) -> anyhow::Result<Self> {
        Ok(Self {
            users: accounts.into_iter().collect(),
            dummy_hash: hash_password("decoy-password-for-unknown-users")?,
        })
    }

    /// Build the store from configured accounts, falling back to the dev
    /// fixture when none are configured.
    pub fn from_config(accounts: &[AccountConfig]) -> anyhow::Result<Self> {
        if accounts.is_empty() {
            tracing::warn!(
                "no accounts configured — seeding dev fixture account '{}'",
                DEV_USERNAME
            );
            let hash = hash_password(DEV_PASSWORD)?;
            return Self::new([(DEV_USERNAME.to_string(), hash)]);
        }
        Self::new(
            accounts
                .iter()
                .map(|a| (a.username.clone(), a.password_hash.clone())),
        )
    }

    /// Check a plaintext password against the stored hash for `username`.
    /// Unknown user and wrong password are indistinguishable to the caller.
    pub fn verify(&self, username: &str, plaintext: &str) -> bool {
        match self.users.get(username) {
            Some(hash) => verify_hash(plaintext, hash),
            None => {
                verify_hash(plaintext, &self.dummy_hash);
                false
            }
        }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<Identity> {
        if self.verify(username, password) {
            Some(Identity::new(username))
        } else {
            None
        }
    }
}

/// Hash a plaintext password into an Argon2id PHC string.
pub fn hash_password(plaintext: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))
}

fn verify_hash(plaintext: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
