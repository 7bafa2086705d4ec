//! Shared state for all routes.

use std::sync::Arc;

use applylog_core::{backend::StoreBackend, repository::ApplicationRepository};

pub struct AppState<B: StoreBackend> {
    pub repository: Arc<ApplicationRepository<B>>,
    /// Largest `limit` the list endpoint accepts.
    pub max_page_size: u64,
}

impl<B: StoreBackend> AppState<B> {
    pub fn new(repository: Arc<ApplicationRepository<B>>, max_page_size: u64) -> Self {
        Self { repository, max_page_size }
    }
}

impl<B: StoreBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            max_page_size: self.max_page_size,
        }
    }
}
