//! In-memory storage implementation for document stores.
//!
//! Documents are kept as BSON in ordered maps keyed by ObjectId behind an
//! async-aware read-write lock. Every operation holds the lock for its whole
//! duration, which gives the same per-document atomicity MongoDB provides.

use std::{cmp::Ordering, collections::{BTreeMap, HashMap}, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};

use applylog_core::{
    backend::{GroupCount, StoreBackend, StoreBackendBuilder, UpdateOutcome},
    error::StoreResult,
    query::{Query, SortDirection},
};

use crate::evaluator::{Comparable, DocumentEvaluator};

type CollectionMap = BTreeMap<ObjectId, Document>;
type StoreMap = HashMap<String, CollectionMap>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so clones
/// share the same data.
///
/// # Performance
///
/// Queries scan every document in a collection (no indexing), which is fine for
/// development and test data sets.
///
/// # Example
///
/// ```ignore
/// use applylog_memory::InMemoryStore;
/// use applylog_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.insert_document("applications", doc! { "company_name": "Acme" }).await?;
/// assert!(store.get_document("applications", &id).await?.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Whether `collection` holds no documents.
    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_document(&self, collection: &str, mut document: Document) -> StoreResult<ObjectId> {
        document.remove("_id");
        let id = ObjectId::new();

        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id, document);

        Ok(id)
    }

    async fn find_documents(&self, collection: &str, query: Query) -> StoreResult<Vec<(ObjectId, Document)>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut matched = Vec::new();
        for (id, doc) in collection_map {
            let keep = match &query.filter {
                Some(filter) => DocumentEvaluator::new(doc).evaluate(filter)?,
                None => true,
            };
            if keep {
                matched.push((*id, doc));
            }
        }

        if let Some(sort) = &query.sort {
            // Stable sort, so ties keep insertion (ObjectId) order.
            matched.sort_by(|(_, a), (_, b)| {
                let left = Comparable::field(a, &sort.field);
                let right = Comparable::field(b, &sort.field);

                match sort.direction {
                    SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                    SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
                }
            });
        }

        Ok(
            matched
                .into_iter()
                .skip(query.offset.unwrap_or(0) as usize)
                .take(query.limit.map(|limit| limit as usize).unwrap_or(usize::MAX))
                .map(|(id, doc)| (id, doc.clone()))
                .collect()
        )
    }

    async fn get_document(&self, collection: &str, id: &ObjectId) -> StoreResult<Option<(ObjectId, Document)>> {
        Ok(
            self.store
                .read()
                .await
                .get(collection)
                .and_then(|col| col.get(id))
                .map(|doc| (*id, doc.clone()))
        )
    }

    async fn update_document(&self, collection: &str, id: &ObjectId, set: Document) -> StoreResult<UpdateOutcome> {
        let mut store = self.store.write().await;
        let Some(doc) = store
            .get_mut(collection)
            .and_then(|col| col.get_mut(id))
        else {
            return Ok(UpdateOutcome::default());
        };

        let mut modified = false;
        for (key, value) in set {
            if key == "_id" {
                continue;
            }
            if doc.get(&key) != Some(&value) {
                doc.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome { matched: 1, modified: u64::from(modified) })
    }

    async fn delete_document(&self, collection: &str, id: &ObjectId) -> StoreResult<bool> {
        Ok(
            self.store
                .write()
                .await
                .get_mut(collection)
                .and_then(|col| col.remove(id))
                .is_some()
        )
    }

    async fn group_count(&self, collection: &str, keys: &[&str]) -> StoreResult<Vec<GroupCount>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut groups: Vec<GroupCount> = Vec::new();
        for doc in collection_map.values() {
            let key = keys
                .iter()
                .map(|field| (field.to_string(), doc.get(*field).cloned().unwrap_or(Bson::Null)))
                .collect::<Document>();

            match groups.iter_mut().find(|group| group.key == key) {
                Some(group) => group.count += 1,
                None => groups.push(GroupCount { key, count: 1 }),
            }
        }

        Ok(groups)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new, empty [`InMemoryStore`]. Always succeeds.
    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use applylog_core::query::Filter;
    use bson::doc;

    const COLLECTION: &str = "applications";

    async fn seeded() -> (InMemoryStore, Vec<ObjectId>) {
        let store = InMemoryStore::builder().build().await.unwrap();
        let mut ids = Vec::new();
        for (n, (category, status)) in [("campus", "applied"), ("campus", "applied"), ("campus", "offer")]
            .into_iter()
            .enumerate()
        {
            ids.push(
                store
                    .insert_document(
                        COLLECTION,
                        doc! { "category": category, "status": status, "rank": n as i64 },
                    )
                    .await
                    .unwrap(),
            );
        }
        (store, ids)
    }

    #[tokio::test]
    async fn insert_assigns_fresh_ids_and_ignores_supplied_one() {
        let store = InMemoryStore::new();
        let supplied = ObjectId::new();

        let id = store
            .insert_document(COLLECTION, doc! { "_id": supplied, "company_name": "Acme" })
            .await
            .unwrap();

        assert_ne!(id, supplied);
        let (_, body) = store.get_document(COLLECTION, &id).await.unwrap().unwrap();
        assert_eq!(body, doc! { "company_name": "Acme" });
    }

    #[tokio::test]
    async fn find_filters_sorts_and_pages() {
        let (store, _) = seeded().await;

        let applied = store
            .find_documents(
                COLLECTION,
                Query::builder().filter(Filter::eq("status", "applied")).build(),
            )
            .await
            .unwrap();
        assert_eq!(applied.len(), 2);

        let page = store
            .find_documents(
                COLLECTION,
                Query::builder()
                    .sort("rank", SortDirection::Desc)
                    .offset(1)
                    .limit(1)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].1.get_i64("rank").unwrap(), 1);
    }

    #[tokio::test]
    async fn find_on_unknown_collection_is_empty() {
        let store = InMemoryStore::new();

        let found = store.find_documents("nothing", Query::new()).await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn update_sets_only_given_fields_and_reports_changes() {
        let (store, ids) = seeded().await;

        let outcome = store
            .update_document(COLLECTION, &ids[0], doc! { "status": "interview" })
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        let (_, body) = store.get_document(COLLECTION, &ids[0]).await.unwrap().unwrap();
        assert_eq!(body, doc! { "category": "campus", "status": "interview", "rank": 0_i64 });

        let unchanged = store
            .update_document(COLLECTION, &ids[0], doc! { "status": "interview" })
            .await
            .unwrap();
        assert_eq!(unchanged, UpdateOutcome { matched: 1, modified: 0 });

        let missing = store
            .update_document(COLLECTION, &ObjectId::new(), doc! { "status": "offer" })
            .await
            .unwrap();
        assert_eq!(missing, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (store, ids) = seeded().await;

        assert!(store.delete_document(COLLECTION, &ids[1]).await.unwrap());
        assert!(!store.delete_document(COLLECTION, &ids[1]).await.unwrap());
        assert_eq!(store.len(COLLECTION).await, 2);
    }

    #[tokio::test]
    async fn group_count_omits_empty_groups() {
        let (store, _) = seeded().await;

        let mut groups = store
            .group_count(COLLECTION, &["category", "status"])
            .await
            .unwrap();
        groups.sort_by_key(|group| group.count);

        assert_eq!(
            groups,
            vec![
                GroupCount { key: doc! { "category": "campus", "status": "offer" }, count: 1 },
                GroupCount { key: doc! { "category": "campus", "status": "applied" }, count: 2 },
            ]
        );
    }
}
