//! Request extractors that gate handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the signed-in user from a Bearer token.

pub mod auth;
