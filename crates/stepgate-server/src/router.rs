//! Router construction.

use std::sync::Arc;

use axum::routing::post;
use axum::{Extension, Router};
use stepgate_gateway::Gateway;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Build the axum router around a shared gateway.
pub fn build_router(gateway: Arc<Gateway>) -> Router {
  Router::new()
    .route("/", post(handler::dispatch))
    .layer(Extension(gateway))
    .layer(TraceLayer::new_for_http())
}
