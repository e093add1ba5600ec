/// Domain-level error shared across the workspace.
///
/// The HTTP layer maps each variant onto a status code.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
