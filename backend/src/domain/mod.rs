//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed social-feed core (identities, posts,
//! follow edges, and the services that operate on them) independent of any
//! transport or storage technology. Keep types immutable and document
//! invariants in each type's Rustdoc.
//!
//! Public surface:
//! - [`Error`]/[`ErrorCode`] — transport-agnostic failure payload.
//! - [`User`], [`Post`] and their validated component newtypes.
//! - [`Session`] — verified-identity wrapper required by mutating services.
//! - [`IdentityService`], [`FollowService`], [`PostService`],
//!   [`FeedService`] — the four component services.
//! - [`ports`] — repository and hashing traits the outbound adapters
//!   implement.

pub mod auth;
pub mod error;
pub mod feed_service;
pub mod follow_service;
pub mod identity_service;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod session;
pub mod user;

pub use self::auth::{
    LoginCredentials, LoginValidationError, RegistrationRequest, RegistrationValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed_service::FeedService;
pub use self::follow_service::FollowService;
pub use self::identity_service::IdentityService;
pub use self::post::{Post, PostContent, PostId, PostValidationError};
pub use self::post_service::PostService;
pub use self::session::Session;
pub use self::user::{EmailAddress, User, UserId, UserValidationError, Username};
