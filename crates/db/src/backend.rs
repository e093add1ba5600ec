//! Storage backends: one JSON document per name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

static DOC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("valid regex"));

/// Reject document names that could escape the data directory.
pub fn validate_doc_name(name: &str) -> StoreResult<()> {
    if DOC_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// Whole-document persistence used by the record store.
///
/// Implementations only load and save complete documents; all
/// read-modify-write sequencing happens in the store.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Load a document, or `None` if it has never been saved.
    async fn load(&self, name: &str) -> StoreResult<Option<Value>>;

    /// Replace a document with `value`.
    async fn save(&self, name: &str, value: &Value) -> StoreResult<()>;

    /// Check that the backend can currently be used.
    async fn health_check(&self) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Stores each document as `<dir>/<name>.json`.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so readers never see a half-written file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a data directory.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        validate_doc_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn load(&self, name: &str) -> StoreResult<Option<Value>> {
        let path = self.path_for(name)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            document: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(value))
    }

    async fn save(&self, name: &str, value: &Value) -> StoreResult<()> {
        let path = self.path_for(name)?;
        let tmp = self.dir.join(format!(".{name}.{}.tmp", Uuid::new_v4()));
        let bytes = serde_json::to_vec_pretty(value)?;

        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(document = name, bytes = bytes.len(), "Saved document");
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        let meta = tokio::fs::metadata(&self.dir).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Io(std::io::Error::other(format!(
                "{} is not a directory",
                self.dir.display()
            ))))
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Keeps documents in a map. Used by tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    docs: RwLock<HashMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load(&self, name: &str) -> StoreResult<Option<Value>> {
        validate_doc_name(name)?;
        Ok(self.docs.read().await.get(name).cloned())
    }

    async fn save(&self, name: &str, value: &Value) -> StoreResult<()> {
        validate_doc_name(name)?;
        self.docs.write().await.insert(name.to_string(), value.clone());
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
