//! Shared helpers for Diesel repository implementations.

use crate::domain::post::{Post, PostContent, PostId, PostValidationError};
use crate::domain::user::{EmailAddress, User, UserId, UserValidationError, Username};

use super::models::{PostRow, UserRow};

diesel::define_sql_function! {
    /// SQL `lower()`, used for case-insensitive username matching.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Rehydrate a domain user from its storage row.
///
/// Stored values normally satisfy the domain invariants by construction;
/// a failure here means the row was written by something other than this
/// core and is surfaced as a query error by the callers.
pub(crate) fn domain_user_from_row(row: UserRow) -> Result<User, UserValidationError> {
    Ok(User::new(
        UserId::new(row.id),
        Username::new(row.username)?,
        EmailAddress::new(row.email)?,
        row.password_hash,
        row.joined_at,
        row.is_admin,
    ))
}

/// Rehydrate a domain post from its storage row.
pub(crate) fn domain_post_from_row(row: PostRow) -> Result<Post, PostValidationError> {
    Ok(Post::new(
        PostId::new(row.id),
        UserId::new(row.author_id),
        PostContent::new(row.content)?,
        row.created_at,
    ))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row rehydration.
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn user_row_rehydrates_into_domain_user() {
        let row = UserRow {
            id: 7,
            username: "Alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            joined_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            is_admin: true,
        };

        let user = domain_user_from_row(row).expect("valid row");

        assert_eq!(user.id(), UserId::new(7));
        assert_eq!(user.username().as_ref(), "Alice");
        assert!(user.is_admin());
    }

    #[rstest]
    fn corrupt_user_row_fails_validation() {
        let row = UserRow {
            id: 7,
            username: "not valid!".to_owned(),
            email: "alice@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            joined_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            is_admin: false,
        };

        assert!(domain_user_from_row(row).is_err());
    }

    #[rstest]
    fn post_row_rehydrates_into_domain_post() {
        let row = PostRow {
            id: 3,
            author_id: 7,
            content: "hello".to_owned(),
            created_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        };

        let post = domain_post_from_row(row).expect("valid row");

        assert_eq!(post.id(), PostId::new(3));
        assert_eq!(post.author_id(), UserId::new(7));
        assert_eq!(post.content().as_ref(), "hello");
    }
}
