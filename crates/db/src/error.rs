/// Errors raised by the record store and its backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No record with key {key} in {collection}")]
    NotFound { collection: String, key: String },

    #[error("A record with key {key} already exists in {collection}")]
    DuplicateKey { collection: String, key: String },

    #[error("`{field}` {value} is already taken in {collection}")]
    DuplicateField {
        collection: String,
        field: &'static str,
        value: String,
    },

    #[error("Record in {collection} is missing its key field `{field}`")]
    MissingKey {
        collection: String,
        field: &'static str,
    },

    #[error("Invalid document name: {0}")]
    InvalidName(String),

    #[error("Document {document} is corrupt: {reason}")]
    Corrupt { document: String, reason: String },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
