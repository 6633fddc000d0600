//! Account service: registration, login and profile maintenance.
//!
//! Implements [`AccountCommand`] and [`AccountQuery`] over the user
//! repository plus the credential and media ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, AccountQuery, AuthenticatedAccount, CredentialError, MediaStorage,
    MediaStorageError, PasswordChange, PasswordHasher, Registration, TokenService,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, ImageUpload, LoginCredentials, NewAccount, ProfileUpdate, Role, SessionClaims, User,
    UserId,
};

const USER_NOT_FOUND: &str = "User not found";
const INVALID_LOGIN: &str = "Invalid email or password";

/// Collaborators the account service drives besides the repository.
#[derive(Clone)]
pub struct AccountCollaborators {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub media: Arc<dyn MediaStorage>,
    pub clock: Arc<dyn Clock>,
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    deps: AccountCollaborators,
    allow_role_self_assignment: bool,
}

impl<U> AccountService<U> {
    pub fn new(users: Arc<U>, deps: AccountCollaborators) -> Self {
        Self {
            users,
            deps,
            allow_role_self_assignment: false,
        }
    }

    /// Honour the `role` field sent at registration.
    pub fn with_role_self_assignment(mut self, allowed: bool) -> Self {
        self.allow_role_self_assignment = allowed;
        self
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict("User already exists"),
    }
}

pub(crate) fn map_credential_error(error: CredentialError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_media_error(error: MediaStorageError) -> Error {
    match error {
        MediaStorageError::Io { message } => {
            Error::internal(format!("media storage failed: {message}"))
        }
        MediaStorageError::InvalidPath { path } => {
            Error::invalid_request(format!("invalid media path: {path}"))
        }
    }
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    async fn save(&self, user: &User) -> Result<(), Error> {
        if self.users.update(user).await.map_err(map_user_error)? {
            Ok(())
        } else {
            Err(Error::not_found(USER_NOT_FOUND))
        }
    }

    fn sign_in(&self, user: User) -> Result<AuthenticatedAccount, Error> {
        let claims = SessionClaims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        };
        let token = self
            .deps
            .tokens
            .issue(&claims)
            .map_err(map_credential_error)?;
        Ok(AuthenticatedAccount { user, token })
    }

    fn granted_role(&self, requested: Option<Role>) -> Role {
        match requested {
            Some(role) if self.allow_role_self_assignment => role,
            Some(role) if role != Role::User => {
                warn!(requested = %role, "ignoring self-assigned role at registration");
                Role::User
            }
            _ => Role::User,
        }
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<AuthenticatedAccount, Error> {
        let existing = self
            .users
            .find_by_email(&registration.email)
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::conflict("User already exists"));
        }

        let password_hash = self
            .deps
            .hasher
            .hash(&registration.password)
            .await
            .map_err(map_credential_error)?;
        let user = User::register(
            NewAccount {
                role: self.granted_role(registration.requested_role),
                first_name: registration.first_name,
                last_name: registration.last_name,
                email: registration.email,
                password_hash,
            },
            self.deps.clock.utc(),
        );
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, role = %user.role, "account registered");
        self.sign_in(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthenticatedAccount, Error> {
        let mut user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_LOGIN))?;

        let matches = self
            .deps
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await
            .map_err(map_credential_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_LOGIN));
        }
        if !user.is_active {
            return Err(Error::forbidden("Account is deactivated"));
        }

        let now = self.deps.clock.utc();
        user.last_login = Some(now);
        user.updated_at = now;
        self.save(&user).await?;
        self.sign_in(user)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        update.apply_to(&mut user, self.deps.clock.utc());
        self.save(&user).await?;
        Ok(user)
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        change: PasswordChange,
    ) -> Result<(), Error> {
        let mut user = self.load(user_id).await?;
        let matches = self
            .deps
            .hasher
            .verify(change.current_password.as_str(), &user.password_hash)
            .await
            .map_err(map_credential_error)?;
        if !matches {
            return Err(Error::invalid_request("Current password is incorrect"));
        }

        user.password_hash = self
            .deps
            .hasher
            .hash(&change.new_password)
            .await
            .map_err(map_credential_error)?;
        user.updated_at = self.deps.clock.utc();
        self.save(&user).await?;
        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error> {
        if !self.users.delete(user_id).await.map_err(map_user_error)? {
            return Err(Error::not_found(USER_NOT_FOUND));
        }
        info!(user_id = %user_id, "account deleted");
        Ok(())
    }

    async fn replace_avatar(&self, user_id: &UserId, upload: ImageUpload) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        user.avatar = self
            .deps
            .media
            .store(&upload)
            .await
            .map_err(map_media_error)?;
        user.updated_at = self.deps.clock.utc();
        self.save(&user).await?;
        Ok(user)
    }
}

#[async_trait]
impl<U> AccountQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }

    async fn list_users(&self, page: PageRequest) -> Result<Paginated<User>, Error> {
        let (users, total) = self.users.list(page).await.map_err(map_user_error)?;
        Ok(Paginated::new(users, page, total))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
