//! Document store handle.
//!
//! [`DocumentStore`] owns a backend for the lifetime of the process. It is opened once at
//! start-up, passed explicitly to whatever needs it, and closed with
//! [`DocumentStore::shutdown`].
//!
//! # Example
//!
//! ```ignore
//! use applylog_core::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! let applications = store.typed_collection::<ApplicationDocument>();
//! ```

use crate::{
    backend::StoreBackend,
    collection::TypedCollection,
    document::Document,
    error::StoreResult,
};

/// A strongly-typed document store bound to a specific backend implementation.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Gets a typed collection for the specified document type.
    ///
    /// The collection name is determined by the document type's `collection_name()` method.
    pub fn typed_collection<'a, D: Document>(&'a self) -> TypedCollection<'a, B, D> {
        TypedCollection::new(&self.backend)
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Checks that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`](crate::error::StoreError::Unavailable) when it is not.
    pub async fn ping(&self) -> StoreResult<()> {
        self.backend.ping().await
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// This consumes the store and should be called when no longer needed.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}
