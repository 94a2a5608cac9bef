//! Authenticated-session adapter.
//!
//! A session is a separate value wrapping a verified identity rather than
//! behaviour mixed into the user record itself. Holding a [`Session`] is the
//! proof-of-login the mutating services require.

use super::user::{User, UserId, Username};

/// Verified identity wrapper handed out by a successful authentication.
///
/// A `Session` can only be built from a [`User`] the identity service has
/// already verified, so service methods taking `&Session` need no further
/// auth checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
}

impl Session {
    /// Wrap a verified user into a session.
    pub const fn for_user(user: User) -> Self {
        Self { user }
    }

    /// Identifier of the logged-in user.
    pub const fn user_id(&self) -> UserId {
        self.user.id()
    }

    /// Handle of the logged-in user.
    pub const fn username(&self) -> &Username {
        self.user.username()
    }

    /// Whether the logged-in user carries the admin flag.
    pub const fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Borrow the wrapped user record.
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Consume the session, returning the wrapped user.
    pub fn into_user(self) -> User {
        self.user
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::user::EmailAddress;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn verified_user(is_admin: bool) -> User {
        User::new(
            UserId::new(42),
            Username::new("alice").expect("valid username"),
            EmailAddress::new("alice@example.com").expect("valid email"),
            "$argon2id$stub".to_owned(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            is_admin,
        )
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn session_forwards_identity_attributes(#[case] is_admin: bool) {
        let session = Session::for_user(verified_user(is_admin));

        assert_eq!(session.user_id(), UserId::new(42));
        assert_eq!(session.username().as_ref(), "alice");
        assert_eq!(session.is_admin(), is_admin);
    }

    #[rstest]
    fn into_user_returns_the_wrapped_record() {
        let user = verified_user(false);
        let session = Session::for_user(user.clone());
        assert_eq!(session.into_user(), user);
    }
}
