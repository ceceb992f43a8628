//! Error types for mapper operations.

use thiserror::Error;

/// Result type for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors that can occur in mapper operations.
#[derive(Debug, Error)]
pub enum MapperError {
    /// Schema or payload serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Document lookup or mutation failed.
    #[error("Document error: {0}")]
    Document(#[from] crate::document::DocumentError),

    /// Registry could not be built or loaded.
    #[error("Registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    /// Inbound envelope rejected before dispatch.
    #[error("Protocol error: {0}")]
    Protocol(String),
}
