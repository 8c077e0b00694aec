//! Salted password digests.
//!
//! Digests are Argon2id PHC strings, so the salt and cost parameters travel
//! with the hash and old rows keep verifying after the config changes.

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tokio::task;

use crate::config::SecurityConfig;

/// Plaintext hashed once at startup so that logins for unknown usernames
/// spend the same time verifying as logins with a wrong password.
const DUMMY_PASSWORD: &str = "feedback-timing-equaliser";

#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    dummy_hash: Arc<str>,
}

impl CredentialHasher {
    pub fn new(config: &SecurityConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        hasher.dummy_hash = Arc::from(hasher.hash(DUMMY_PASSWORD)?);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produces a fresh digest with a random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// True iff `plaintext` hashes to `digest` under the digest's own salt
    /// and parameters. Malformed digests never verify.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Argon2 is CPU-intensive, so the async variants run on the blocking pool.
    pub async fn hash_async(&self, plaintext: String) -> Result<String> {
        let hasher = self.clone();
        task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .context("Password hashing task panicked")?
    }

    pub async fn verify_async(&self, plaintext: String, digest: String) -> Result<bool> {
        let hasher = self.clone();
        task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .context("Password verification task panicked")
    }

    /// Burns one verification against the internal digest. The result is
    /// always discarded.
    pub async fn verify_dummy(&self, plaintext: String) -> Result<()> {
        let digest = self.dummy_hash.to_string();
        self.verify_async(plaintext, digest).await.map(|_| ())
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> CredentialHasher {
    CredentialHasher::new(&SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..SecurityConfig::default()
    })
    .unwrap()
}
