//! Authentication and registration payloads.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError, Username};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email failed the identity newtype checks.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials consumed by the identity service.
///
/// ## Invariants
/// - `email` satisfies the [`EmailAddress`] invariants.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons; it is zeroed on drop.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("alice@example.com", "password").unwrap();
/// assert_eq!(creds.email().as_ref(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(LoginValidationError::Email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Address used for the account lookup.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Domain error returned when registration payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Username or email failed the identity newtype checks.
    Identity(UserValidationError),
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl From<UserValidationError> for RegistrationValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::Identity(value)
    }
}

/// Validated registration payload consumed by the identity service.
///
/// The plaintext password is held only until the service hashes it, and is
/// zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
    is_admin: bool,
}

impl RegistrationRequest {
    /// Construct a registration payload from raw string inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
            is_admin: false,
        })
    }

    /// Mark the account as an administrator.
    #[must_use]
    pub fn with_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Requested handle.
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Requested login address.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether the account should carry the admin flag.
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }
}
