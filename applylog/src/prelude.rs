//! Convenient re-exports of commonly used types from applylog.
//!
//! ```ignore
//! use applylog::prelude::*;
//! ```
//!
//! This provides access to:
//! - The record schema and the repository
//! - Store backends and builders
//! - The HTTP router, its state and configuration
//! - Error types

pub use applylog_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    clock::{Clock, SystemClock},
    error::{ApplicationError, ApplicationResult, StoreError, StoreResult},
    page::PageParams,
    record::{
        ApplicationFields, ApplicationPatch, ApplicationRecord, ApplicationStats, Category,
        ListFilter, Status, StatusCount,
    },
    repository::ApplicationRepository,
    store::DocumentStore,
};

pub use crate::{
    config::{ConfigError, ServerConfig, StoreKind},
    http::{ApiError, AppState, build_router},
};
