//! Driving port for account mutations: registration, login and profile
//! maintenance.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{
    EmailAddress, Error, ImageUpload, LoginCredentials, PersonName, PlainPassword, ProfileUpdate,
    Role, SessionToken, User, UserId,
};

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password: PlainPassword,
    /// Role asked for by the client; only honoured when self-assignment is
    /// enabled.
    pub requested_role: Option<Role>,
}

/// Validated password change request.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: Zeroizing<String>,
    pub new_password: PlainPassword,
}

/// Account plus a freshly issued session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub user: User,
    pub token: SessionToken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Open an account and sign the new user in.
    async fn register(&self, registration: Registration) -> Result<AuthenticatedAccount, Error>;

    /// Verify credentials, record the login and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthenticatedAccount, Error>;

    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate)
    -> Result<User, Error>;

    async fn change_password(&self, user_id: &UserId, change: PasswordChange)
    -> Result<(), Error>;

    /// Delete the account. Enrollments are left in place.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error>;

    /// Store a new avatar and point the profile at it.
    async fn replace_avatar(&self, user_id: &UserId, upload: ImageUpload) -> Result<User, Error>;
}
