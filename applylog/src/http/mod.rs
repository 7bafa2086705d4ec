//! HTTP surface of the tracker: axum router, handlers, shared state and error mapping.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
