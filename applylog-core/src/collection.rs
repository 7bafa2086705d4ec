//! Typed collection access for document store operations.
//!
//! A [`TypedCollection`] binds a backend to one [`Document`] type and converts between
//! typed values and the BSON bodies the backend stores.
//!
//! # Example
//!
//! ```ignore
//! let applications = store.typed_collection::<ApplicationDocument>();
//! let id = applications.insert(&document).await?;
//! let stored = applications.get(&id).await?;
//! ```

use bson::{Document as BsonDocument, oid::ObjectId};
use std::marker::PhantomData;

use crate::{
    backend::{GroupCount, StoreBackend, UpdateOutcome},
    document::{Document, DocumentExt, Stored},
    error::StoreResult,
    query::Query,
};

#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: &'static str,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self { name: D::collection_name(), backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Inserts a new document and returns its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if serialization or insertion fails.
    pub async fn insert(&self, document: &D) -> StoreResult<ObjectId> {
        self.backend
            .insert_document(self.name, document.to_document()?)
            .await
    }

    /// Queries documents in the collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the query or decoding fails.
    pub async fn find(&self, query: Query) -> StoreResult<Vec<Stored<D>>> {
        self.backend
            .find_documents(self.name, query)
            .await?
            .into_iter()
            .map(Stored::<D>::decode)
            .collect()
    }

    /// Retrieves a document by identifier, or `None` when it does not exist.
    pub async fn get(&self, id: &ObjectId) -> StoreResult<Option<Stored<D>>> {
        self.backend
            .get_document(self.name, id)
            .await?
            .map(Stored::<D>::decode)
            .transpose()
    }

    /// Writes only the fields present in `set`.
    pub async fn update(&self, id: &ObjectId, set: BsonDocument) -> StoreResult<UpdateOutcome> {
        self.backend
            .update_document(self.name, id, set)
            .await
    }

    /// Deletes a document by identifier. Returns whether a document was removed.
    pub async fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        self.backend
            .delete_document(self.name, id)
            .await
    }

    /// Counts documents per distinct combination of `keys`.
    pub async fn group_count(&self, keys: &[&str]) -> StoreResult<Vec<GroupCount>> {
        self.backend
            .group_count(self.name, keys)
            .await
    }
}
