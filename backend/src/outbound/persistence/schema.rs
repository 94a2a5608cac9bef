//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; regenerate with `diesel print-schema` when migrations change.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` is unique case-insensitively (unique index on
    /// `lower(username)`); `email` is unique as stored.
    users (id) {
        /// Primary key: storage-assigned sequence value.
        id -> Int8,
        /// Handle the account registered under, original casing.
        username -> Varchar,
        /// Address the account authenticates with.
        email -> Varchar,
        /// Argon2 PHC-format password hash.
        password_hash -> Varchar,
        /// Registration timestamp.
        joined_at -> Timestamptz,
        /// Administrator flag.
        is_admin -> Bool,
    }
}

diesel::table! {
    /// Authored content items, one owner each.
    posts (id) {
        /// Primary key: storage-assigned sequence value; feed tie-break.
        id -> Int8,
        /// Owning user; cascades on user deletion.
        author_id -> Int8,
        /// Post body, non-empty.
        content -> Text,
        /// Creation timestamp; immutable.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges, unique per ordered pair.
    follows (id) {
        /// Primary key: storage-assigned sequence value.
        id -> Int8,
        /// Follower; cascades on user deletion.
        from_user_id -> Int8,
        /// Followed user; cascades on user deletion.
        to_user_id -> Int8,
        /// Edge creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, posts, follows);
