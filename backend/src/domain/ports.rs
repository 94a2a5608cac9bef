//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the relational store and the password-hashing capability). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::post::{Post, PostContent, PostId};
use super::user::{EmailAddress, User, UserId, Username};

/// Persistence errors raised by [`UserRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Insert collided with the username or email uniqueness constraint.
    #[error("user already exists: {message}")]
    Duplicate {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl UserPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for uniqueness violations.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`PostRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostPersistenceError {
    /// Repository connection could not be established.
    #[error("post repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("post repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl PostPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`FollowRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FollowPersistenceError {
    /// Repository connection could not be established.
    #[error("follow repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("follow repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Insert collided with the `(from_user, to_user)` uniqueness constraint.
    #[error("follow edge already present: {message}")]
    AlreadyExists {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl FollowPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for duplicate-edge violations.
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }
}

/// Failures raised by the password-hashing capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Producing a hash failed.
    #[error("password hashing failed: {message}")]
    Hash {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The stored hash could not be parsed or compared.
    #[error("password verification failed: {message}")]
    Verify {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl PasswordHashError {
    /// Helper for hashing failures.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }

    /// Helper for verification failures.
    pub fn verify(message: impl Into<String>) -> Self {
        Self::Verify {
            message: message.into(),
        }
    }
}

/// Insert payload for a new user record.
///
/// The password arrives already hashed; repositories never see plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Handle the account registers under.
    pub username: Username,
    /// Address the account authenticates with.
    pub email: EmailAddress,
    /// Opaque one-way hash of the chosen password.
    pub password_hash: String,
    /// Registration timestamp stamped by the domain clock.
    pub joined_at: DateTime<Utc>,
    /// Whether the account carries the admin flag.
    pub is_admin: bool,
}

/// Insert payload for a new post record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Identifier of the authoring user.
    pub author_id: UserId,
    /// Validated post body.
    pub content: PostContent,
    /// Creation timestamp stamped by the domain clock.
    pub created_at: DateTime<Utc>,
}

/// Row cap applied to every feed query.
///
/// # Examples
/// ```
/// use backend::domain::ports::FeedLimit;
///
/// assert_eq!(FeedLimit::default().rows(), 100);
/// assert!(FeedLimit::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLimit(i64);

/// Default row cap for feed queries.
pub const DEFAULT_FEED_LIMIT: i64 = 100;

/// Validation error returned by [`FeedLimit::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("feed limit must be a positive row count")]
pub struct FeedLimitValidationError;

impl FeedLimit {
    /// Construct a cap from a positive row count.
    pub const fn new(rows: i64) -> Result<Self, FeedLimitValidationError> {
        if rows <= 0 {
            return Err(FeedLimitValidationError);
        }
        Ok(Self(rows))
    }

    /// Row count this cap permits.
    pub const fn rows(self) -> i64 {
        self.0
    }
}

impl Default for FeedLimit {
    fn default() -> Self {
        Self(DEFAULT_FEED_LIMIT)
    }
}

impl fmt::Display for FeedLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistence port for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, relying on the storage uniqueness constraints to
    /// reject duplicate usernames or emails.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact email match.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by case-insensitive exact username match.
    async fn find_by_username_ci(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError>;
}

/// Persistence port for post records and feed reads.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post, returning it with its assigned identifier.
    async fn insert(&self, post: &NewPost) -> Result<Post, PostPersistenceError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostPersistenceError>;

    /// All posts authored by `author`, newest first.
    async fn by_author(&self, author: UserId) -> Result<Vec<Post>, PostPersistenceError>;

    /// Most recent posts across all authors, newest first, capped at `limit`.
    async fn recent(&self, limit: FeedLimit) -> Result<Vec<Post>, PostPersistenceError>;

    /// Most recent posts authored by `author`, newest first, capped at `limit`.
    async fn recent_by_author(
        &self,
        author: UserId,
        limit: FeedLimit,
    ) -> Result<Vec<Post>, PostPersistenceError>;

    /// Most recent posts authored by `viewer` or by any user `viewer`
    /// follows, newest first, capped at `limit`.
    async fn recent_by_author_or_followed(
        &self,
        viewer: UserId,
        limit: FeedLimit,
    ) -> Result<Vec<Post>, PostPersistenceError>;
}

/// Persistence port for the directed follow graph.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the edge `from -> to`, relying on the composite uniqueness
    /// constraint to reject a second identical edge.
    async fn insert(&self, from: UserId, to: UserId) -> Result<(), FollowPersistenceError>;

    /// Delete the edge `from -> to`; returns `false` when no edge existed.
    async fn delete(&self, from: UserId, to: UserId) -> Result<bool, FollowPersistenceError>;

    /// Users that `user` follows (edges leaving `user`).
    async fn following_of(&self, user: UserId) -> Result<Vec<User>, FollowPersistenceError>;

    /// Users following `user` (edges arriving at `user`).
    async fn followers_of(&self, user: UserId) -> Result<Vec<User>, FollowPersistenceError>;
}

/// One-way password hashing capability.
///
/// `hash` produces an opaque PHC-format string; `verify` checks a plaintext
/// against it. There is no decryption path.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into an opaque verifier string.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext against a stored hash; `Ok(false)` means the
    /// password simply did not match.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
