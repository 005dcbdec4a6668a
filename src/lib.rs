pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

// Serve with `into_make_service_with_connect_info::<SocketAddr>()`, the write
// route needs the peer address for rate limiting
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/random", get(handlers::random_handler))
        .route("/write", post(handlers::write_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}
