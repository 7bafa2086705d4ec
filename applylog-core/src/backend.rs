//! Storage backend abstraction for the document store.
//!
//! This module defines the trait that abstracts over storage implementations, allowing the
//! data-access layer to run against MongoDB in production and an in-memory store in tests.
//!
//! # Overview
//!
//! The [`StoreBackend`] trait provides a unified async interface for the single-document
//! operations the service needs (insert, find, get, partial update, delete) plus a
//! grouping query that counts documents per distinct key. Each call is atomic at the
//! single-document granularity; nothing spans multiple documents.
//!
//! Identifiers are store-native [`ObjectId`]s. Bodies travel as BSON documents without
//! an `_id` field; the backend owns that field and returns it alongside each body.
//!
//! # Examples
//!
//! ```ignore
//! use applylog_core::backend::StoreBackend;
//! use bson::doc;
//!
//! let id = backend.insert_document("applications", doc! { "company_name": "Acme" }).await?;
//! let found = backend.get_document("applications", &id).await?;
//! assert!(found.is_some());
//! ```

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{error::StoreResult, query::Query};

/// Result of a partial update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of documents the update's identifier matched (0 or 1).
    pub matched: u64,
    /// Number of documents whose stored content changed (0 or 1).
    pub modified: u64,
}

/// One group produced by [`StoreBackend::group_count`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    /// The grouping key, one entry per requested field. Missing fields are `Null`.
    pub key: Document,
    /// Number of documents sharing this key.
    pub count: u64,
}

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and support concurrent access from multiple
/// async tasks. The service holds no state of its own between calls and relies on the
/// backend's per-document atomicity.
///
/// # Error Handling
///
/// Connectivity problems should be reported as
/// [`StoreError::Unavailable`](crate::error::StoreError::Unavailable) so callers can
/// distinguish an unreachable store from a failed operation.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a new document and returns the identifier the store assigned to it.
    ///
    /// Any `_id` key present in `document` is ignored.
    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<ObjectId>;

    /// Queries documents in a collection.
    ///
    /// Applies the filter, then the sort, then `offset` and `limit`. Returns an empty
    /// vector when nothing matches.
    async fn find_documents(
        &self,
        collection: &str,
        query: Query,
    ) -> StoreResult<Vec<(ObjectId, Document)>>;

    /// Retrieves a single document by identifier.
    async fn get_document(
        &self,
        collection: &str,
        id: &ObjectId,
    ) -> StoreResult<Option<(ObjectId, Document)>>;

    /// Overwrites only the top-level fields present in `set`, leaving every other field
    /// of the stored document untouched.
    async fn update_document(
        &self,
        collection: &str,
        id: &ObjectId,
        set: Document,
    ) -> StoreResult<UpdateOutcome>;

    /// Deletes a document by identifier. Returns whether a document was removed.
    async fn delete_document(&self, collection: &str, id: &ObjectId) -> StoreResult<bool>;

    /// Groups every document of a collection by the given top-level fields and counts
    /// the members of each group.
    ///
    /// Only groups with at least one member are returned; the order is unspecified.
    async fn group_count(&self, collection: &str, keys: &[&str]) -> StoreResult<Vec<GroupCount>>;

    /// Round-trips the store to check it is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op; backends holding connections override it.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<ObjectId> {
        (*self)
            .insert_document(collection, document)
            .await
    }

    async fn find_documents(
        &self,
        collection: &str,
        query: Query,
    ) -> StoreResult<Vec<(ObjectId, Document)>> {
        (*self)
            .find_documents(collection, query)
            .await
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &ObjectId,
    ) -> StoreResult<Option<(ObjectId, Document)>> {
        (*self).get_document(collection, id).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &ObjectId,
        set: Document,
    ) -> StoreResult<UpdateOutcome> {
        (*self)
            .update_document(collection, id, set)
            .await
    }

    async fn delete_document(&self, collection: &str, id: &ObjectId) -> StoreResult<bool> {
        (*self).delete_document(collection, id).await
    }

    async fn group_count(&self, collection: &str, keys: &[&str]) -> StoreResult<Vec<GroupCount>> {
        (*self).group_count(collection, keys).await
    }

    async fn ping(&self) -> StoreResult<()> {
        (*self).ping().await
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
