//! Route table.

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use applylog_core::backend::StoreBackend;

use super::{
    handlers::{create, delete, health, list, read, root, stats, update},
    state::AppState,
};

/// Builds the API router. Collection routes answer with and without the trailing slash.
pub fn build_router<B: StoreBackend + 'static>(state: AppState<B>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::<B>))
        .route("/applications", get(list::<B>).post(create::<B>))
        .route("/applications/", get(list::<B>).post(create::<B>))
        .route("/applications/stats", get(stats::<B>))
        .route(
            "/applications/:id",
            get(read::<B>).put(update::<B>).delete(delete::<B>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
