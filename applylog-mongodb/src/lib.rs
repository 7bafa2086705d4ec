//! MongoDB backend implementation for applylog.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait,
//! persisting application records with MongoDB's query and aggregation engine.
//!
//! It is enabled through the `mongodb` feature of the `applylog` crate (on by default):
//!
//! ```toml
//! [dependencies]
//! applylog = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Server-side querying** - Filtering, sorting and paging run in MongoDB
//! - **Aggregation** - Per-key counts through a `$group` pipeline
//! - **Connectivity checks** - `ping` round-trips the server
//!
//! # Connection
//!
//! The backend needs a MongoDB connection string and a database name, both supplied
//! through the builder. The driver connects lazily.
//!
//! # Example
//!
//! ```ignore
//! use applylog::{backend::{StoreBackend, StoreBackendBuilder}, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "job_tracker")
//!         .build()
//!         .await?;
//!     store.ping().await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as applylog_mongodb;

pub mod store;
pub mod query;
pub mod sanitizer;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
