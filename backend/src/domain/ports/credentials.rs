//! Credential ports: password hashing and session token signing.
//!
//! Both are driven ports so services stay independent of the concrete
//! algorithms, and tests can swap in cheap doubles.
use async_trait::async_trait;

use crate::domain::{PasswordHash, PlainPassword, SessionClaims, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing, verifying or signing.
    pub enum CredentialError {
        /// The password hash could not be produced or parsed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The session token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

define_port_error! {
    /// Reasons a presented token is rejected.
    pub enum TokenRejection {
        /// The token has passed its expiry time.
        Expired => "token expired",
        /// Signature, structure or claims are invalid.
        Invalid { message: String } => "invalid token: {message}",
    }
}

/// Hashes and verifies passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash for storage.
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, CredentialError>;

    /// Check a candidate password against a stored hash.
    async fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, CredentialError>;
}

/// Issues and verifies signed session tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign `claims` into a bearer token.
    fn issue(&self, claims: &SessionClaims) -> Result<SessionToken, CredentialError>;

    /// Validate a bearer token and return its claims.
    fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection>;
}
