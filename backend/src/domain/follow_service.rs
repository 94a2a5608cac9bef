//! Follow-graph domain service.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ports::{FollowPersistenceError, FollowRepository, UserRepository};
use crate::domain::session::Session;
use crate::domain::user::{User, UserId};

use super::identity_service::map_user_persistence_error;

/// Service over the directed follow graph.
///
/// Targets are always resolved by case-insensitive username, the way every
/// profile reference reaches this core. A missing target surfaces as
/// `NotFound` rather than being silently ignored.
#[derive(Clone)]
pub struct FollowService<U, F> {
    users: Arc<U>,
    follows: Arc<F>,
}

impl<U, F> FollowService<U, F> {
    /// Create a new service over the user and follow repositories.
    pub fn new(users: Arc<U>, follows: Arc<F>) -> Self {
        Self { users, follows }
    }
}

fn map_follow_persistence_error(error: FollowPersistenceError) -> Error {
    match error {
        FollowPersistenceError::Connection { message } => Error::service_unavailable(message),
        FollowPersistenceError::Query { message } => Error::internal(message),
        FollowPersistenceError::AlreadyExists { .. } => Error::already_exists("already following"),
    }
}

impl<U, F> FollowService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn resolve_target(&self, to_username: &str) -> Result<User, Error> {
        let maybe_user = self
            .users
            .find_by_username_ci(to_username)
            .await
            .map_err(map_user_persistence_error)?;

        maybe_user.ok_or_else(|| Error::not_found("user not found"))
    }

    /// Follow `to_username` from the session user.
    ///
    /// Fails `NotFound` when the target does not exist, `InvalidInput` on a
    /// self-follow, and `AlreadyExists` when the edge is already present.
    /// Returns the resolved target.
    pub async fn follow(&self, session: &Session, to_username: &str) -> Result<User, Error> {
        let target = self.resolve_target(to_username).await?;
        if target.id() == session.user_id() {
            return Err(Error::invalid_input("cannot follow yourself"));
        }

        self.follows
            .insert(session.user_id(), target.id())
            .await
            .map_err(map_follow_persistence_error)?;

        Ok(target)
    }

    /// Unfollow `to_username` from the session user.
    ///
    /// Fails `NotFound` when the target does not exist or when no edge was
    /// present. Returns the resolved target.
    pub async fn unfollow(&self, session: &Session, to_username: &str) -> Result<User, Error> {
        let target = self.resolve_target(to_username).await?;

        let removed = self
            .follows
            .delete(session.user_id(), target.id())
            .await
            .map_err(map_follow_persistence_error)?;

        if !removed {
            return Err(Error::not_found("not following"));
        }

        Ok(target)
    }

    /// Users that `user` follows.
    pub async fn following_of(&self, user: UserId) -> Result<Vec<User>, Error> {
        self.follows
            .following_of(user)
            .await
            .map_err(map_follow_persistence_error)
    }

    /// Users following `user`.
    pub async fn followers_of(&self, user: UserId) -> Result<Vec<User>, Error> {
        self.follows
            .followers_of(user)
            .await
            .map_err(map_follow_persistence_error)
    }
}
