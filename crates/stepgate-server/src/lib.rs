//! HTTP transport for the admission gateway.
//!
//! A single `POST /` endpoint accepts the action envelope
//! (`{"action": ..., "payload": ...}`) and answers with
//! `{"success": true, ...}` or `{"success": false, "error": ...}`.

pub mod error;
pub mod handler;
pub mod router;

pub use error::AppError;
pub use router::build_router;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Header naming the principal that triggered a request.
pub const TRIGGERED_BY_HEADER: &str = "x-triggered-by";

/// Principal recorded when the caller does not name one.
pub const DEFAULT_TRIGGERED_BY: &str = "api";

/// Serve the router until `shutdown` is cancelled.
pub async fn serve(
  listener: TcpListener,
  app: axum::Router,
  shutdown: CancellationToken,
) -> std::io::Result<()> {
  let addr: Option<SocketAddr> = listener.local_addr().ok();
  info!(addr = ?addr, "stepgate listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
}
