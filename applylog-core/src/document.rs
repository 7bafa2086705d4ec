//! Core traits and types for document representation and serialization.
//!
//! This module provides the trait that every stored document type implements,
//! and utilities for converting documents to and from BSON.

use bson::{Bson, Document as BsonDocument, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{StoreError, StoreResult};

/// Core trait that all documents stored in a document store must implement.
///
/// A document body never carries its own identifier. The store assigns an [`ObjectId`]
/// on insert and hands it back next to the body (see [`Stored`]).
///
/// # Example
///
/// ```ignore
/// use applylog_core::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Note {
///     pub text: String,
/// }
///
/// impl Document for Note {
///     fn collection_name() -> &'static str {
///         "notes"
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this document belongs to.
    ///
    /// This should be a static, lowercase identifier (e.g., "applications").
    fn collection_name() -> &'static str;
}

/// Extension trait providing BSON conversion for documents.
///
/// Automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON document for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the value is not a map.
    fn to_document(&self) -> StoreResult<BsonDocument>;

    /// Creates a document from a stored BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_document(document: BsonDocument) -> StoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_document(&self) -> StoreResult<BsonDocument> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            other => Err(StoreError::InvalidDocument(format!(
                "expected a document for collection {}, got {:?}",
                D::collection_name(),
                other.element_type()
            ))),
        }
    }

    fn from_document(document: BsonDocument) -> StoreResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }
}

/// A document body paired with the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<D> {
    pub id: ObjectId,
    pub document: D,
}

impl<D: Document> Stored<D> {
    /// Decodes a raw `(id, body)` pair returned by a backend.
    pub fn decode((id, document): (ObjectId, BsonDocument)) -> StoreResult<Self> {
        Ok(Self { id, document: D::from_document(document)? })
    }
}
