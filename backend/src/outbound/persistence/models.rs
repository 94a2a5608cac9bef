//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{follows, posts, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub joined_at: DateTime<Utc>,
    pub is_admin: bool,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub joined_at: DateTime<Utc>,
    pub is_admin: bool,
}

/// Row struct for reading from the posts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new post records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub author_id: i64,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new follow edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub from_user_id: i64,
    pub to_user_id: i64,
}
