//! Social-feed core: identity, follow graph, posts, and feed composition.
//!
//! The crate is laid out hexagonally: [`domain`] holds entities, services,
//! and the ports they drive; [`outbound`] holds the PostgreSQL persistence
//! adapters and the Argon2 password-hashing adapter. The web layer in front
//! of this core is a separate concern and lives elsewhere.

pub mod domain;
pub mod outbound;
