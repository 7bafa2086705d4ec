//! Job-application tracker: record keeping over a document store behind a small
//! HTTP API.
//!
//! This crate is the entry point of the applylog workspace. It re-exports the core
//! types from `applylog-core`, gives access to the storage backends, and provides
//! the axum router, configuration and error mapping used by the `applylog` binary.
//!
//! # Features
//!
//! - **Typed records** - Categories, statuses, dates and links are checked by the type system
//! - **Multiple backends** - MongoDB for persistence, in-memory for tests and local runs
//! - **Partial updates** - Only supplied fields are written; `last_updated` is refreshed
//! - **Stats** - Record counts per (category, status)
//!
//! # Quick Start
//!
//! ```ignore
//! use applylog::{prelude::*, memory::InMemoryStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repository = Arc::new(ApplicationRepository::new(DocumentStore::new(InMemoryStore::new())));
//!     let app = build_router(AppState::new(repository, 1000));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod config;
pub mod http;
pub mod prelude;

pub use applylog_core::{backend, clock, collection, document, error, page, query, record, repository, store};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use applylog_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use applylog_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
