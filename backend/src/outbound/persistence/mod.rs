//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types; uniqueness constraints surface as the
//!   dedicated duplicate variants rather than generic query failures.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub(crate) mod diesel_helpers;
mod diesel_follow_repository;
mod diesel_post_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Migrations compiled into the binary, so deployments need no migration
/// files on disk.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while applying pending migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The migration connection could not be established.
    #[error("failed to connect for migrations: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// A migration failed to apply.
    #[error("failed to run migrations: {message}")]
    Execution {
        /// Underlying failure description.
        message: String,
    },
}

/// Apply any pending embedded migrations over a fresh synchronous
/// connection.
///
/// Runs once at startup, before the async pool is built.
pub fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|err| MigrationError::Connection {
            message: err.to_string(),
        })?;

    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| MigrationError::Execution {
            message: err.to_string(),
        })
}
