//! Driving port for account reads.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// The caller's own profile.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// One page of all accounts.
    async fn list_users(&self, page: PageRequest) -> Result<Paginated<User>, Error>;
}
