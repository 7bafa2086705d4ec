//! Error types and result types for store and data-access operations.
//!
//! Two layers of errors live here:
//!
//! - [`StoreError`] is what a [`StoreBackend`](crate::backend::StoreBackend) reports.
//! - [`ApplicationError`] is what the data-access layer reports to its callers, using the
//!   taxonomy the HTTP boundary maps onto status codes.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The store could not be reached (server selection, network, timeouts).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// A stored document does not have the expected structure.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A filter could not be translated into a store query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for store backend operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors surfaced by the application data-access layer and the record schema.
#[derive(Error, Debug)]
pub enum ApplicationError {
    /// No record matches the identifier, or the identifier is malformed.
    #[error("Application not found: {0}")]
    NotFound(String),
    /// A field failed a schema, enum or URL check.
    #[error("Validation error: {0}")]
    Validation(String),
    /// An update carried no field to write.
    #[error("No fields supplied to update")]
    NothingToUpdate,
    /// The document store cannot be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// A store operation failed, or a write against an existing record did not apply.
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
}

/// A specialized `Result` type for data-access operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) | StoreError::Initialization(msg) => {
                ApplicationError::StorageUnavailable(msg)
            }
            other => ApplicationError::StorageOperationFailed(other.to_string()),
        }
    }
}
