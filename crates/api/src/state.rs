use std::sync::Arc;

use bizdir_core::seed::SeedCatalog;
use bizdir_core::types::Record;
use bizdir_db::{Collection, RecordStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Record store over the configured backend.
    pub store: Arc<RecordStore>,
    /// Server configuration (token settings, admin account).
    pub config: Arc<ServerConfig>,
    /// Initial datasets for collections that were never persisted.
    pub seeds: Arc<SeedCatalog>,
}

impl AppState {
    /// Seed dataset for `collection`.
    pub fn seed(&self, collection: &Collection) -> &[Record] {
        self.seeds.get(collection.name)
    }
}
