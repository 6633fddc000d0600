//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashing is CPU bound, so both operations run on the blocking thread pool
//! instead of stalling the Actix workers.

use async_trait::async_trait;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash as EncodedHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialError, PasswordHasher};
use crate::domain::{PasswordHash, PlainPassword};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &[u8]) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password, &salt)
        .map(|encoded| encoded.to_string())
        .map_err(|error| CredentialError::hashing(error.to_string()))
}

fn verify_blocking(candidate: &[u8], encoded: &str) -> Result<bool, CredentialError> {
    let parsed =
        EncodedHash::new(encoded).map_err(|error| CredentialError::hashing(error.to_string()))?;
    match Argon2::default().verify_password(candidate, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(error) => Err(CredentialError::hashing(error.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, CredentialError> {
        let secret = Zeroizing::new(password.expose().as_bytes().to_vec());
        let encoded = task::spawn_blocking(move || hash_blocking(&secret))
            .await
            .map_err(|error| CredentialError::hashing(error.to_string()))??;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, CredentialError> {
        let secret = Zeroizing::new(candidate.as_bytes().to_vec());
        let encoded = hash.as_str().to_owned();
        task::spawn_blocking(move || verify_blocking(&secret, &encoded))
            .await
            .map_err(|error| CredentialError::hashing(error.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn hashes_verify_only_the_original_password() {
        let hasher = Argon2PasswordHasher::new();
        let password = PlainPassword::new("correct horse").expect("valid password");

        let hash = hasher.hash(&password).await.expect("hash");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).await.expect("verify"));
        assert!(!hasher.verify("wrong horse", &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let hasher = Argon2PasswordHasher::new();
        let password = PlainPassword::new("same-password").expect("valid password");
        let first = hasher.hash(&password).await.expect("hash");
        let second = hasher.hash(&password).await.expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let hasher = Argon2PasswordHasher::new();
        let error = hasher
            .verify("anything", &PasswordHash::new("not-a-phc-string"))
            .await
            .expect_err("malformed hash");
        assert!(matches!(error, CredentialError::Hashing { .. }));
    }
}
