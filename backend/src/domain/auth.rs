//! Authentication primitives: credentials, password material and session
//! claims.
//!
//! Inbound adapters validate raw strings through these constructors before a
//! service or credential port sees them. Secret material is held in
//! [`Zeroizing`] buffers so it is wiped when dropped.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::ids::UserId;
use super::user::{EmailAddress, Role};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    #[error("Please enter email and password")]
    MissingLoginFields,
    #[error("Please provide a valid email")]
    InvalidEmail,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised the same way accounts store it.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use coursehub::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CredentialValidationError::MissingLoginFields);
        }
        let email =
            EmailAddress::new(email).map_err(|_| CredentialValidationError::InvalidEmail)?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Plain-text password that satisfies the length policy.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        if raw.chars().count() < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(<redacted>)")
    }
}

/// Encoded password hash as produced by the credential service.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Identity and role carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub role: Role,
}

/// Signed bearer token plus its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
