//! Tests against a live MongoDB server. Run with
//! `MONGO_URI=mongodb://localhost:27017 cargo test -p applylog-mongodb -- --ignored`.

use applylog_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    page::PageParams,
    query::{Filter, Query, SortDirection},
    record::{ApplicationFields, ApplicationPatch, Category, ListFilter, Status},
    repository::ApplicationRepository,
    store::DocumentStore,
};
use applylog_mongodb::MongoDbStore;
use bson::{doc, oid::ObjectId};
use chrono::Utc;

async fn connect() -> MongoDbStore {
    let uri = std::env::var("MONGO_URI").expect("MONGO_URI must be set for MongoDB tests");
    let database = format!("applylog_test_{}", ObjectId::new().to_hex());

    MongoDbStore::builder(&uri, &database)
        .build()
        .await
        .expect("failed to build MongoDB store")
}

fn fields(company: &str, category: Category, status: Status) -> ApplicationFields {
    ApplicationFields {
        company_name: company.to_string(),
        role: "SWE".to_string(),
        category,
        status,
        date_applied: "2024-01-10".parse().unwrap(),
        important_dates: None,
        links: None,
        notes: None,
    }
}

#[tokio::test]
#[ignore]
async fn backend_round_trips_documents_with_dotted_keys() {
    let store = connect().await;
    store.ping().await.unwrap();

    let id = store
        .insert_document("scratch", doc! { "links": { "v1.2": "https://example.com/a.b" }, "rank": 1_i64 })
        .await
        .unwrap();
    store.insert_document("scratch", doc! { "rank": 2_i64 }).await.unwrap();

    let (found_id, body) = store.get_document("scratch", &id).await.unwrap().unwrap();
    assert_eq!(found_id, id);
    assert_eq!(body, doc! { "links": { "v1.2": "https://example.com/a.b" }, "rank": 1_i64 });

    let sorted = store
        .find_documents("scratch", Query::builder().sort("rank", SortDirection::Desc).limit(1).build())
        .await
        .unwrap();
    assert_eq!(sorted[0].1.get_i64("rank").unwrap(), 2);

    let filtered = store
        .find_documents("scratch", Query::builder().filter(Filter::eq("rank", 1_i64)).build())
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);

    let outcome = store.update_document("scratch", &id, doc! { "rank": 1_i64 }).await.unwrap();
    assert_eq!((outcome.matched, outcome.modified), (1, 0));

    assert!(store.delete_document("scratch", &id).await.unwrap());
    assert!(!store.delete_document("scratch", &id).await.unwrap());

    store.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn repository_lifecycle_against_mongodb() {
    let repository = ApplicationRepository::new(DocumentStore::new(connect().await));
    let before = Utc::now().timestamp_millis();

    let acme = repository.create(fields("Acme", Category::Campus, Status::Applied)).await.unwrap();
    repository.create(fields("Globex", Category::Campus, Status::Applied)).await.unwrap();
    repository.create(fields("Initech", Category::Hackathon, Status::Offer)).await.unwrap();

    let record = repository.get_by_id(&acme).await.unwrap().unwrap();
    assert!(record.last_updated.timestamp_millis() >= before);

    let patch = ApplicationPatch { status: Some(Status::Interview), ..Default::default() };
    assert!(repository.update(&acme, &patch).await.unwrap());

    let listed = repository.list(ListFilter::default(), PageParams::default()).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id, acme);

    let stats = repository.aggregate_stats().await.unwrap();
    assert_eq!(stats.counts.len(), 3);
    assert_eq!(stats.counts.iter().map(|count| count.count).sum::<u64>(), 3);

    assert!(repository.delete(&acme).await.unwrap());
    assert!(repository.get_by_id(&acme).await.unwrap().is_none());
    assert!(repository.get_by_id("not-an-id").await.unwrap().is_none());

    repository.shutdown().await.unwrap();
}
