//! Post content model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Validation errors returned by [`PostContent::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Content was empty once trimmed.
    EmptyContent,
    /// Content exceeds the accepted length.
    ContentTooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "post content must not be empty"),
            Self::ContentTooLong { max } => {
                write!(f, "post content must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Stable post identifier assigned by the storage sequence.
///
/// Identifiers grow monotonically with insertion order, which is what makes
/// them usable as the feed-ordering tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    /// Wrap a storage-assigned identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for post content.
pub const POST_CONTENT_MAX: usize = 10_000;

/// Body of a post.
///
/// ## Invariants
/// - Non-empty once trimmed; surrounding whitespace is dropped on
///   construction.
/// - At most [`POST_CONTENT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostContent(String);

impl PostContent {
    /// Validate and construct [`PostContent`] from owned input.
    pub fn new(content: impl Into<String>) -> Result<Self, PostValidationError> {
        Self::from_owned(content.into())
    }

    fn from_owned(content: String) -> Result<Self, PostValidationError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        if trimmed.chars().count() > POST_CONTENT_MAX {
            return Err(PostValidationError::ContentTooLong {
                max: POST_CONTENT_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PostContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PostContent> for String {
    fn from(value: PostContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostContent {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Authored content item, owned by exactly one user.
///
/// Immutable after creation; this core has no edit or delete path for posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    id: PostId,
    author_id: UserId,
    content: PostContent,
    created_at: DateTime<Utc>,
}

impl Post {
    /// Build a [`Post`] from validated components.
    pub const fn new(
        id: PostId,
        author_id: UserId,
        content: PostContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author_id,
            content,
            created_at,
        }
    }

    /// Stable post identifier.
    pub const fn id(&self) -> PostId {
        self.id
    }

    /// Identifier of the owning user.
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Post body.
    pub const fn content(&self) -> &PostContent {
        &self.content
    }

    /// Creation timestamp; immutable after creation.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
