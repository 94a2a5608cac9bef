//! User identity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors returned by the identity newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was empty once trimmed.
    EmptyUsername,
    /// Username exceeds the storage column width.
    UsernameTooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// Username contains characters outside `[A-Za-z0-9_]`.
    UsernameInvalidCharacters,
    /// Email was empty once trimmed.
    EmptyEmail,
    /// Email exceeds the storage column width.
    EmailTooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// Email is not of the shape `local@domain`.
    EmailMalformed,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, or underscores",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmailMalformed => write!(f, "email must look like local@domain"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier assigned by the storage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a storage-assigned identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

/// Unique handle a user registers under.
///
/// Stored with the casing the user chose; matched case-insensitively
/// everywhere a username is looked up.
///
/// ## Invariants
/// - Non-empty, no surrounding whitespace.
/// - At most [`USERNAME_MAX`] characters, all from `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-folded form used for case-insensitive comparisons.
    pub fn folded(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 255;

/// Email address a user authenticates with.
///
/// Only the `local@domain` shape is enforced here; full address validation
/// belongs to the form layer in front of this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`] from owned input.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::EmailMalformed);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::EmailMalformed);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Registered account.
///
/// ## Invariants
/// - `username` and `email` satisfy their newtype invariants.
/// - `password_hash` is an opaque one-way hash; the plaintext is never held.
///
/// The record is immutable after registration: this core has no update or
/// delete path for accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    password_hash: String,
    joined_at: DateTime<Utc>,
    is_admin: bool,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(
        id: UserId,
        username: Username,
        email: EmailAddress,
        password_hash: String,
        joined_at: DateTime<Utc>,
        is_admin: bool,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            joined_at,
            is_admin,
        }
    }

    /// Stable user identifier.
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Handle the user registered under.
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Address the user authenticates with.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Opaque password hash; only meaningful to the hashing capability.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Timestamp of registration.
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Whether the account carries the admin flag.
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[cfg(test)]
mod tests;
