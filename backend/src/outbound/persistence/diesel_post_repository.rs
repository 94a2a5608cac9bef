//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.
//!
//! Feed reads order by `(created_at DESC, id DESC)` so identical timestamps
//! still produce a total, deterministic order. The home-feed union resolves
//! followed authors with a subquery against the follows table inside a
//! single statement.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{FeedLimit, NewPost, PostPersistenceError, PostRepository};
use crate::domain::post::{Post, PostId};
use crate::domain::user::UserId;

use super::diesel_helpers::domain_post_from_row;
use super::models::{NewPostRow, PostRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, posts};

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain post persistence errors.
fn map_pool_error(error: PoolError) -> PostPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PostPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain post persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> PostPersistenceError {
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
        DieselError::NotFound => PostPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PostPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PostPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => PostPersistenceError::query("database error"),
        _ => PostPersistenceError::query("database error"),
    }
}

fn map_row(row: PostRow) -> Result<Post, PostPersistenceError> {
    domain_post_from_row(row).map_err(|err| {
        PostPersistenceError::query(format!("stored post failed validation: {err}"))
    })
}

fn map_rows(rows: Vec<PostRow>) -> Result<Vec<Post>, PostPersistenceError> {
    rows.into_iter().map(map_row).collect()
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, post: &NewPost) -> Result<Post, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPostRow {
            author_id: post.author_id.value(),
            content: post.content.as_ref(),
            created_at: post.created_at,
        };

        let row: PostRow = diesel::insert_into(posts::table)
            .values(&new_row)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_row(row)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<PostRow> = posts::table
            .filter(posts::id.eq(id.value()))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(map_row).transpose()
    }

    async fn by_author(&self, author: UserId) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .filter(posts::author_id.eq(author.value()))
            .order((posts::created_at.desc(), posts::id.desc()))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_rows(rows)
    }

    async fn recent(&self, limit: FeedLimit) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit.rows())
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_rows(rows)
    }

    async fn recent_by_author(
        &self,
        author: UserId,
        limit: FeedLimit,
    ) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .filter(posts::author_id.eq(author.value()))
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit.rows())
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_rows(rows)
    }

    async fn recent_by_author_or_followed(
        &self,
        viewer: UserId,
        limit: FeedLimit,
    ) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let followed_ids = follows::table
            .filter(follows::from_user_id.eq(viewer.value()))
            .select(follows::to_user_id);

        let rows: Vec<PostRow> = posts::table
            .filter(
                posts::author_id
                    .eq(viewer.value())
                    .or(posts::author_id.eq_any(followed_ids)),
            )
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit.rows())
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        map_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping.
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, PostPersistenceError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::NotFound);

        assert!(matches!(repo_err, PostPersistenceError::Query { .. }));
        assert!(repo_err.to_string().contains("record not found"));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let diesel_err = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("connection closed".to_owned()),
        );

        assert!(matches!(
            map_diesel_error(diesel_err),
            PostPersistenceError::Connection { .. }
        ));
    }
}
