//! PostgreSQL-backed `FollowRepository` implementation using Diesel ORM.
//!
//! The `(from_user_id, to_user_id)` pair is unique at the database level;
//! this adapter translates the resulting unique violations into
//! [`FollowPersistenceError::AlreadyExists`] instead of pre-reading the edge.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{FollowPersistenceError, FollowRepository};
use crate::domain::user::{User, UserId};

use super::diesel_helpers::domain_user_from_row;
use super::models::{NewFollowRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, users};

/// Diesel-backed implementation of the `FollowRepository` port.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain follow persistence errors.
fn map_pool_error(error: PoolError) -> FollowPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            FollowPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain follow persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> FollowPersistenceError {
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
            FollowPersistenceError::already_exists(info.message().to_owned())
        }
        DieselError::NotFound => FollowPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => FollowPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FollowPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => FollowPersistenceError::query("database error"),
        _ => FollowPersistenceError::query("database error"),
    }
}

fn map_rows(rows: Vec<UserRow>) -> Result<Vec<User>, FollowPersistenceError> {
    rows.into_iter()
        .map(|row| {
            domain_user_from_row(row).map_err(|err| {
                FollowPersistenceError::query(format!("stored user failed validation: {err}"))
            })
        })
        .collect()
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn insert(&self, from: UserId, to: UserId) -> Result<(), FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFollowRow {
            from_user_id: from.value(),
            to_user_id: to.value(),
        };

        diesel::insert_into(follows::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, from: UserId, to: UserId) -> Result<bool, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            follows::table
                .filter(follows::from_user_id.eq(from.value()))
                .filter(follows::to_user_id.eq(to.value())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn following_of(&self, user: UserId) -> Result<Vec<User>, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let followed_ids = follows::table
            .filter(follows::from_user_id.eq(user.value()))
            .select(follows::to_user_id);

        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(followed_ids))
            .order(users::joined_at.desc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_rows(rows)
    }

    async fn followers_of(&self, user: UserId) -> Result<Vec<User>, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let follower_ids = follows::table
            .filter(follows::to_user_id.eq(user.value()))
            .select(follows::from_user_id);

        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(follower_ids))
            .order(users::joined_at.desc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_rows(rows)
    }
}
