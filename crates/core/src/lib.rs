//! Domain building blocks shared by the record store and the HTTP layer.
//!
//! Nothing in here depends on the record store or on HTTP, so both the
//! `db` and `api` crates build on it.

pub mod collections;
pub mod error;
pub mod roles;
pub mod search;
pub mod seed;
pub mod slug;
pub mod types;
