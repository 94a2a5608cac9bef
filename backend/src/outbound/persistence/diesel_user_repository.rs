//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Uniqueness of usernames (case-insensitive) and emails is enforced by the
//! database constraints; this adapter translates the resulting unique
//! violations into [`UserPersistenceError::Duplicate`] instead of pre-reading.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{NewUser, UserPersistenceError, UserRepository};
use crate::domain::user::{EmailAddress, User, UserId};

use super::diesel_helpers::{domain_user_from_row, lower};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain user persistence errors.
fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain user persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserPersistenceError::duplicate(info.message().to_owned())
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => UserPersistenceError::query("database error"),
        _ => UserPersistenceError::query("database error"),
    }
}

fn map_row(row: UserRow) -> Result<User, UserPersistenceError> {
    domain_user_from_row(row).map_err(|err| {
        UserPersistenceError::query(format!("stored user failed validation: {err}"))
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            joined_at: user.joined_at,
            is_admin: user.is_admin,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_row(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<UserRow> = users::table
            .filter(users::id.eq(id.value()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(map_row).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(map_row).transpose()
    }

    async fn find_by_username_ci(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<UserRow> = users::table
            .filter(lower(users::username).eq(username.to_lowercase()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(map_row).transpose()
    }
}
