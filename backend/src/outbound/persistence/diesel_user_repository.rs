//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserId};

use super::error_mapping::{
    DieselFailure, classify, collect_rows, page_bounds, total_from_db,
};
use super::models::{UserRecord, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed account store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
        DieselFailure::UniqueViolation { constraint } => {
            UserPersistenceError::query(format!("unique constraint violated: {constraint:?}"))
        }
    }
}

fn convert(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&UserRecord::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match classify(error) {
                DieselFailure::UniqueViolation { .. } => {
                    UserPersistenceError::duplicate_email(user.email.to_string())
                }
                DieselFailure::Connection(message) => UserPersistenceError::connection(message),
                DieselFailure::Query(message) => UserPersistenceError::query(message),
            })
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&UserRecord::from(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.to_string()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (offset, limit) = page_bounds(page);
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::created_at.desc(), users::id.desc()))
            .offset(offset)
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let accounts = collect_rows(rows.into_iter().map(User::try_from), |message| {
            UserPersistenceError::query(message)
        })?;
        Ok((accounts, total_from_db(total)))
    }
}
