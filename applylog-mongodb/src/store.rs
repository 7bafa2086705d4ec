use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::{
    Client, Collection as MongoCollection,
    error::{Error as MongoError, ErrorKind},
    options::{ClientOptions, FindOptions},
};
use tracing::{debug, warn};

use applylog_core::{
    backend::{GroupCount, StoreBackend, StoreBackendBuilder, UpdateOutcome},
    error::{StoreError, StoreResult},
    query::{Query, QueryVisitor, SortDirection},
};

use crate::{sanitizer::KeySanitizer, query::MongoQueryTranslator};


/// Maps a driver error onto the store taxonomy, separating an unreachable server
/// from a failed operation.
fn backend_error(error: MongoError) -> StoreError {
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            warn!(%error, "mongodb unreachable");
            StoreError::Unavailable(error.to_string())
        }
        _ => StoreError::Backend(error.to_string()),
    }
}

/// The server encodes `limit` and `skip` as signed 64-bit integers.
fn signed(name: &str, value: u64) -> StoreResult<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidQuery(format!("{name} {value} exceeds {}", i64::MAX)))
}

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    /// Name of the database this store reads and writes.
    pub fn database_name(&self) -> &str {
        &self.database
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&KeySanitizer::sanitize_key(collection_name))
    }

    fn prepare_document(&self, mut document: Document) -> Document {
        document.remove("_id");
        KeySanitizer::sanitize_document(document)
    }

    /// Splits a stored document into its identifier and its body.
    fn restore_document(&self, mut document: Document) -> StoreResult<(ObjectId, Document)> {
        let id = match document.remove("_id") {
            Some(Bson::ObjectId(id)) => id,
            Some(other) => {
                return Err(StoreError::InvalidDocument(format!(
                    "expected ObjectId `_id`, found {other}"
                )));
            }
            None => return Err(StoreError::InvalidDocument("document has no `_id`".into())),
        };

        Ok((id, KeySanitizer::restore_document(document)))
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<ObjectId> {
        let result = self.get_collection(collection)
            .insert_one(self.prepare_document(document))
            .await
            .map_err(backend_error)?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend(format!(
                "server assigned a non-ObjectId identifier: {}",
                result.inserted_id
            )))
    }

    async fn find_documents(&self, collection: &str, query: Query) -> StoreResult<Vec<(ObjectId, Document)>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(signed("limit", limit)?);
        }
        if let Some(skip) = query.offset {
            signed("offset", skip)?;
            options.skip = Some(skip);
        }
        if let Some(sort) = &query.sort {
            let field = KeySanitizer::sanitize_key(&sort.field);
            options.sort = Some(doc! {
                field: match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            })
        }

        let filter = match &query.filter {
            Some(expr) => MongoQueryTranslator.visit_expr(expr)?,
            None => doc! {},
        };
        debug!(collection, ?filter, "mongodb find");

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(|doc| self.restore_document(doc))
            .collect()
    }

    async fn get_document(&self, collection: &str, id: &ObjectId) -> StoreResult<Option<(ObjectId, Document)>> {
        self.get_collection(collection)
            .find_one(doc! { "_id": *id })
            .await
            .map_err(backend_error)?
            .map(|doc| self.restore_document(doc))
            .transpose()
    }

    async fn update_document(&self, collection: &str, id: &ObjectId, set: Document) -> StoreResult<UpdateOutcome> {
        let result = self.get_collection(collection)
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": self.prepare_document(set) },
            )
            .await
            .map_err(backend_error)?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_document(&self, collection: &str, id: &ObjectId) -> StoreResult<bool> {
        let result = self.get_collection(collection)
            .delete_one(doc! { "_id": *id })
            .await
            .map_err(backend_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn group_count(&self, collection: &str, keys: &[&str]) -> StoreResult<Vec<GroupCount>> {
        let fields = keys
            .iter()
            .map(|key| KeySanitizer::sanitize_key(key))
            .collect::<Vec<_>>();
        let group_id = fields
            .iter()
            .map(|field| (field.clone(), Bson::String(format!("${field}"))))
            .collect::<Document>();

        let groups = self.get_collection(collection)
            .aggregate(vec![doc! {
                "$group": { "_id": group_id, "count": { "$sum": 1 } },
            }])
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)?;

        groups
            .into_iter()
            .map(|group| {
                let id = group
                    .get_document("_id")
                    .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
                // $group drops missing fields from the key instead of nulling them.
                let key = keys
                    .iter()
                    .zip(&fields)
                    .map(|(key, field)| (key.to_string(), id.get(field).cloned().unwrap_or(Bson::Null)))
                    .collect::<Document>();
                let count = match group.get("count") {
                    Some(Bson::Int32(n)) => *n as u64,
                    Some(Bson::Int64(n)) => *n as u64,
                    other => {
                        return Err(StoreError::InvalidDocument(format!(
                            "unexpected group count: {other:?}"
                        )));
                    }
                };

                Ok(GroupCount { key, count })
            })
            .collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.shutdown().await
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    /// Parses the connection string and creates the client.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the first
    /// operation rather than here. Call [`StoreBackend::ping`] to check eagerly.
    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| StoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_values_must_fit_the_signed_range() {
        assert_eq!(signed("limit", 100).unwrap(), 100);
        assert_eq!(signed("offset", i64::MAX as u64).unwrap(), i64::MAX);
        assert!(matches!(
            signed("offset", i64::MAX as u64 + 1),
            Err(StoreError::InvalidQuery(_))
        ));
    }
}
