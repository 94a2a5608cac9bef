//! Post authoring and lookup domain service.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::error::Error;
use crate::domain::post::{Post, PostContent, PostId};
use crate::domain::ports::{NewPost, PostPersistenceError, PostRepository};
use crate::domain::session::Session;
use crate::domain::user::UserId;

/// Shared mapping from post persistence failures to domain errors.
pub(crate) fn map_post_persistence_error(error: PostPersistenceError) -> Error {
    match error {
        PostPersistenceError::Connection { message } => Error::service_unavailable(message),
        PostPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Service over the post store.
#[derive(Clone)]
pub struct PostService<P> {
    posts: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> PostService<P> {
    /// Create a new service over a post repository.
    pub fn new(posts: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { posts, clock }
    }
}

impl<P> PostService<P>
where
    P: PostRepository,
{
    /// Store a new post authored by the session user.
    ///
    /// Content empty after trimming fails `InvalidInput`; the creation
    /// timestamp comes from the injected clock and never changes afterwards.
    pub async fn create_post(&self, session: &Session, content: &str) -> Result<Post, Error> {
        let content = PostContent::new(content)
            .map_err(|err| Error::invalid_input(err.to_string()))?;

        let new_post = NewPost {
            author_id: session.user_id(),
            content,
            created_at: self.clock.utc(),
        };

        self.posts
            .insert(&new_post)
            .await
            .map_err(map_post_persistence_error)
    }

    /// All posts authored by `user`, newest first.
    pub async fn posts_by(&self, user: UserId) -> Result<Vec<Post>, Error> {
        self.posts
            .by_author(user)
            .await
            .map_err(map_post_persistence_error)
    }

    /// Fetch a single post by identifier.
    pub async fn post_by_id(&self, id: PostId) -> Result<Post, Error> {
        let maybe_post = self
            .posts
            .find_by_id(id)
            .await
            .map_err(map_post_persistence_error)?;

        maybe_post.ok_or_else(|| Error::not_found("post not found"))
    }
}
