//! Initial datasets for collections that have never been persisted.
//!
//! The record store writes a collection's seed the first time the
//! collection is read. Built-in seeds can be replaced per collection by
//! dropping `<collection>.json` files (a JSON array of objects) into a seed
//! directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::collections;
use crate::types::Record;

/// Failure while loading seed overrides from disk.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Seed datasets keyed by collection name.
#[derive(Debug, Clone, Default)]
pub struct SeedCatalog {
    sets: HashMap<String, Vec<Record>>,
}

impl SeedCatalog {
    /// A catalog with no seeds: every collection starts out empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The datasets shipped with the server.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(collections::JEWELLERS, builtin_jewellers());
        catalog.insert(collections::CAFES, builtin_cafes());
        catalog.insert(collections::BLOG, builtin_blog());
        catalog.insert(collections::CATEGORIES, builtin_categories());
        catalog.insert(collections::SHOP_CATEGORIES, builtin_shop_categories());
        catalog
    }

    /// Built-in seeds, with any `<collection>.json` in `dir` taking precedence.
    pub fn builtin_with_overrides(dir: &Path) -> Result<Self, SeedError> {
        let mut catalog = Self::builtin();
        let entries = std::fs::read_dir(dir).map_err(|source| SeedError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| SeedError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(collection) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let collection = collection.to_string();
            let raw = std::fs::read_to_string(&path).map_err(|source| SeedError::Io {
                path: path.clone(),
                source,
            })?;
            let records: Vec<Record> =
                serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
                    path: path.clone(),
                    source,
                })?;
            tracing::info!(%collection, count = records.len(), "Loaded seed override");
            catalog.insert(&collection, records);
        }

        Ok(catalog)
    }

    /// Replace the seed for one collection.
    pub fn insert(&mut self, collection: &str, records: Vec<Record>) {
        self.sets.insert(collection.to_string(), records);
    }

    /// Builder form of [`SeedCatalog::insert`].
    pub fn with(mut self, collection: &str, records: Vec<Record>) -> Self {
        self.insert(collection, records);
        self
    }

    /// Seed for `collection`; empty when none is registered.
    pub fn get(&self, collection: &str) -> &[Record] {
        self.sets.get(collection).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Settings document returned before anything has been saved.
pub fn default_settings() -> Value {
    json!({
        "siteName": "Local Business Directory",
        "tagline": "Find the best jewellers and cafes near you",
        "contactEmail": "",
        "contactPhone": "",
        "itemsPerPage": 12,
        "featuredLimit": 6,
        "maintenanceMode": false,
        "socialLinks": {}
    })
}

fn records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn builtin_jewellers() -> Vec<Record> {
    records(json!([
        {
            "slug": "heritage-gold-house",
            "name": "Heritage Gold House",
            "description": "Family-run goldsmiths specialising in bridal sets.",
            "address": "12 Market Street",
            "phone": "+44 20 7946 0010",
            "image": "",
            "category": "Jewellers",
            "rating": 4.8,
            "reviews": 126,
            "featured": true,
            "verified": true,
            "createdAt": "2024-01-10T09:00:00.000Z",
            "updatedAt": "2024-01-10T09:00:00.000Z"
        },
        {
            "slug": "silver-lining-studio",
            "name": "Silver Lining Studio",
            "description": "Handmade silver pieces and custom engraving.",
            "address": "4 Canal Walk",
            "phone": "+44 20 7946 0021",
            "image": "",
            "category": "Jewellers",
            "rating": 4.5,
            "reviews": 58,
            "featured": false,
            "verified": false,
            "createdAt": "2024-01-12T09:00:00.000Z",
            "updatedAt": "2024-01-12T09:00:00.000Z"
        }
    ]))
}

fn builtin_cafes() -> Vec<Record> {
    records(json!([
        {
            "slug": "corner-roastery",
            "name": "Corner Roastery",
            "description": "Small-batch roasts and homemade pastries.",
            "address": "1 High Street",
            "phone": "+44 20 7946 0102",
            "image": "",
            "category": "Cafe",
            "rating": 4.6,
            "reviews": 89,
            "featured": true,
            "createdAt": "2024-01-15T09:00:00.000Z",
            "updatedAt": "2024-01-15T09:00:00.000Z"
        }
    ]))
}

fn builtin_blog() -> Vec<Record> {
    records(json!([
        {
            "slug": "choosing-an-engagement-ring",
            "title": "Choosing an Engagement Ring",
            "excerpt": "What to look for before you visit a jeweller.",
            "content": "Start with a budget, then learn the four Cs.",
            "author": "Admin",
            "category": "Guides",
            "image": "",
            "featured": true,
            "published": true,
            "publishedAt": "2024-02-01T09:00:00.000Z",
            "createdAt": "2024-02-01T09:00:00.000Z",
            "updatedAt": "2024-02-01T09:00:00.000Z"
        }
    ]))
}

fn builtin_categories() -> Vec<Record> {
    records(json!([
        {"id": "jewellers", "slug": "jewellers", "name": "Jewellers", "description": "", "icon": "gem", "count": 0},
        {"id": "cafes", "slug": "cafes", "name": "Cafes", "description": "", "icon": "coffee", "count": 0},
        {"id": "guides", "slug": "guides", "name": "Guides", "description": "", "icon": "book", "count": 0}
    ]))
}

fn builtin_shop_categories() -> Vec<Record> {
    records(json!([
        {"id": "rings", "slug": "rings", "name": "Rings", "description": "", "icon": "ring", "count": 0},
        {"id": "necklaces", "slug": "necklaces", "name": "Necklaces", "description": "", "icon": "necklace", "count": 0},
        {"id": "watches", "slug": "watches", "name": "Watches", "description": "", "icon": "watch", "count": 0}
    ]))
}
