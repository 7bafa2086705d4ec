//! In-memory document storage backend for applylog.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It is used by the test suites and by `APPLYLOG_STORE=memory` for running the API
//! without a database.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Query support** - Exact-match filtering, sorting, offset and limit
//! - **Partial updates** - `$set`-style merges reporting matched/modified counts
//! - **Grouping** - Per-key document counts
//!
//! # Quick Start
//!
//! ```ignore
//! use applylog_core::{repository::ApplicationRepository, store::DocumentStore};
//! use applylog_memory::InMemoryStore;
//!
//! let repository = ApplicationRepository::new(DocumentStore::new(InMemoryStore::new()));
//! ```

#[allow(unused_extern_crates)]
extern crate self as applylog_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
