//! Business directory admin API library.
//!
//! Exposes the building blocks (config, state, error handling, resources,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod resources;
pub mod response;
pub mod routes;
pub mod state;
