//! Data-access layer for application records.
//!
//! [`ApplicationRepository`] is the only component that talks to the document store. It
//! translates hex identifiers into store-native ids, stamps `last_updated`, implements
//! partial-update semantics and runs the (category, status) grouping query.
//!
//! Identifiers that do not parse as an ObjectId are treated exactly like identifiers
//! that match nothing: `get_by_id` returns `None`, `update` and `delete` return `false`.

use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::debug;

use crate::{
    backend::StoreBackend,
    clock::{Clock, SystemClock},
    collection::TypedCollection,
    error::ApplicationResult,
    page::PageParams,
    query::{Query, SortDirection},
    record::{
        ApplicationDocument, ApplicationFields, ApplicationPatch, ApplicationRecord,
        ApplicationStats, ListFilter, StatusCount, fields,
    },
    store::DocumentStore,
};

#[derive(Debug)]
pub struct ApplicationRepository<B: StoreBackend> {
    store: DocumentStore<B>,
    clock: Arc<dyn Clock>,
}

impl<B: StoreBackend> ApplicationRepository<B> {
    /// Creates a repository over `store` stamping records with the system clock.
    pub fn new(store: DocumentStore<B>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(store: DocumentStore<B>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn applications(&self) -> TypedCollection<'_, B, ApplicationDocument> {
        self.store.typed_collection::<ApplicationDocument>()
    }

    /// Stores a new record and returns its identifier.
    pub async fn create(&self, fields: ApplicationFields) -> ApplicationResult<String> {
        let document = ApplicationDocument::new(fields, self.clock.now());
        let id = self.applications().insert(&document).await?;
        debug!(id = %id, "created application");

        Ok(id.to_hex())
    }

    /// Lists records matching `filter`, most recently updated first.
    pub async fn list(
        &self,
        filter: ListFilter,
        page: PageParams,
    ) -> ApplicationResult<Vec<ApplicationRecord>> {
        let mut query = Query::builder()
            .sort(fields::LAST_UPDATED, SortDirection::Desc)
            .offset(page.skip)
            .limit(page.limit);
        if let Some(expr) = filter.to_expr()? {
            query = query.filter(expr);
        }

        let records = self
            .applications()
            .find(query.build())
            .await?
            .into_iter()
            .map(|stored| stored.document.into_record(stored.id))
            .collect::<Vec<_>>();
        debug!(?filter, skip = page.skip, limit = page.limit, found = records.len(), "listed applications");

        Ok(records)
    }

    /// Fetches one record. Absent and malformed identifiers both yield `None`.
    pub async fn get_by_id(&self, id: &str) -> ApplicationResult<Option<ApplicationRecord>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };

        Ok(self
            .applications()
            .get(&oid)
            .await?
            .map(|stored| stored.document.into_record(stored.id)))
    }

    /// Merges the supplied fields into the record and refreshes `last_updated`.
    ///
    /// Returns whether the stored record changed. An empty patch performs no write.
    pub async fn update(&self, id: &str, patch: &ApplicationPatch) -> ApplicationResult<bool> {
        if patch.is_empty() {
            debug!(id, "empty patch, skipping write");
            return Ok(false);
        }
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };

        let set = patch.to_set_document(self.clock.now())?;
        let outcome = self.applications().update(&oid, set).await?;
        debug!(id, matched = outcome.matched, modified = outcome.modified, "updated application");

        Ok(outcome.modified > 0)
    }

    /// Permanently removes the record. Returns whether a record was removed.
    pub async fn delete(&self, id: &str) -> ApplicationResult<bool> {
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };

        let removed = self.applications().delete(&oid).await?;
        debug!(id, removed, "deleted application");

        Ok(removed)
    }

    /// Counts records per observed (category, status) pair.
    pub async fn aggregate_stats(&self) -> ApplicationResult<ApplicationStats> {
        let counts = self
            .applications()
            .group_count(&[fields::CATEGORY, fields::STATUS])
            .await?
            .into_iter()
            .map(StatusCount::from_group)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ApplicationStats { counts })
    }

    /// Checks that the store is reachable.
    pub async fn ping(&self) -> ApplicationResult<()> {
        Ok(self.store.ping().await?)
    }

    /// Closes the underlying store.
    pub async fn shutdown(self) -> ApplicationResult<()> {
        Ok(self.store.shutdown().await?)
    }
}

fn parse_id(id: &str) -> Option<ObjectId> {
    match ObjectId::parse_str(id) {
        Ok(oid) => Some(oid),
        Err(_) => {
            debug!(id, "identifier is not an ObjectId, treating as not found");
            None
        }
    }
}
