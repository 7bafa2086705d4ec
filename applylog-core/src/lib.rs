//! Core of the applylog job-application tracker.
//!
//! This crate provides:
//!
//! - **Record schema** ([`record`]) - Application records, enums and validation
//! - **Data-access layer** ([`repository`]) - Create/list/get/update/delete/stats over a store
//! - **Store backend abstraction** ([`backend`]) - Trait implemented by the MongoDB and in-memory backends
//! - **Query API** ([`query`]) - Exact-match filters, sorting and offset/limit
//! - **Typed collections** ([`collection`]) and the **store handle** ([`store`])
//! - **Error handling** ([`error`]) - Store errors and the data-access error taxonomy
//! - **Pagination** ([`page`]) and **time** ([`clock`])
//!
//! # Example
//!
//! ```ignore
//! use applylog_core::{repository::ApplicationRepository, store::DocumentStore};
//!
//! let repository = ApplicationRepository::new(DocumentStore::new(backend));
//! let id = repository.create(fields).await?;
//! let record = repository.get_by_id(&id).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as applylog_core;

pub mod backend;
pub mod clock;
pub mod collection;
pub mod document;
pub mod error;
pub mod page;
pub mod query;
pub mod record;
pub mod repository;
pub mod store;
