//! JSON document persistence for the directory's collections.
//!
//! - [`backend`] -- where documents live (filesystem or memory).
//! - [`store`] -- the record store: CRUD plus the soft-delete lifecycle
//!   (active -> trash -> gone) over any backend.

pub mod backend;
pub mod error;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::{StoreError, StoreResult};
pub use store::{Collection, RecordStore};
