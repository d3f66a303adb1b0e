//! Stepgate Queue
//!
//! This crate provides the durable queue the gateway publishes work to.
//! The gateway is a pure producer: it sends one [`QueueMessage`] per admitted
//! execution and never reads it back. Consumers (the step executor) own
//! delivery, visibility and retry semantics.
//!
//! The [`Queue`] trait is the seam. [`SqliteQueue`] stores messages in the
//! same database as the executions.

mod message;
mod sqlite;

pub use message::QueueMessage;
pub use sqlite::{SqliteQueue, StoredMessage};

use async_trait::async_trait;

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The message could not be serialized.
  #[error("failed to serialize message: {0}")]
  Serialization(#[from] serde_json::Error),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// The queue backend refused or could not accept the message.
  #[error("queue unavailable: {0}")]
  Unavailable(String),
}

/// Durable queue trait.
#[async_trait]
pub trait Queue: Send + Sync {
  /// Publish a message to the named queue and return its message id.
  async fn send(&self, queue_name: &str, message: &QueueMessage) -> Result<String, Error>;
}
