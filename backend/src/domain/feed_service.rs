//! Feed composition domain service.
//!
//! Derives the three timeline variants from the post store: global, single
//! author, and the session user's home feed. The home feed is the union of
//! self-authored posts and posts by followed authors.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ports::{FeedLimit, PostRepository};
use crate::domain::post::Post;
use crate::domain::session::Session;
use crate::domain::user::UserId;

use super::post_service::map_post_persistence_error;

/// Read-only composer over the post store.
///
/// Every feed is ordered by creation time descending with the storage
/// identifier as tie-break, so ordering is total even for identical
/// timestamps.
#[derive(Clone)]
pub struct FeedService<P> {
    posts: Arc<P>,
}

impl<P> FeedService<P> {
    /// Create a new composer over a post repository.
    pub fn new(posts: Arc<P>) -> Self {
        Self { posts }
    }
}

impl<P> FeedService<P>
where
    P: PostRepository,
{
    /// All posts across all users, newest first, capped at `limit`.
    pub async fn global_feed(&self, limit: FeedLimit) -> Result<Vec<Post>, Error> {
        self.posts
            .recent(limit)
            .await
            .map_err(map_post_persistence_error)
    }

    /// Posts authored by exactly `user`, newest first, capped at `limit`.
    pub async fn user_feed(&self, user: UserId, limit: FeedLimit) -> Result<Vec<Post>, Error> {
        self.posts
            .recent_by_author(user, limit)
            .await
            .map_err(map_post_persistence_error)
    }

    /// Posts authored by the session user or anyone they follow, newest
    /// first, capped at `limit`.
    pub async fn home_feed(&self, session: &Session, limit: FeedLimit) -> Result<Vec<Post>, Error> {
        self.posts
            .recent_by_author_or_followed(session.user_id(), limit)
            .await
            .map_err(map_post_persistence_error)
    }
}
