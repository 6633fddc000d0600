//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already owns the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Email uniqueness is enforced by the store.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Persist changes to an existing account. Returns `false` when the
    /// account no longer exists.
    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove an account. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// List one page of accounts ordered by creation time, plus the total.
    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), UserPersistenceError>;
}
