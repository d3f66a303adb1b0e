use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::{Error, Queue, QueueMessage};

/// A message as stored in the queue table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StoredMessage {
  pub message_id: String,
  pub queue_name: String,
  pub payload: Json<QueueMessage>,
  pub enqueued_at: DateTime<Utc>,
}

/// SQLite-backed queue.
///
/// Messages go into the `queue_messages` table created by the store
/// migrations.
#[derive(Debug, Clone)]
pub struct SqliteQueue {
  pool: SqlitePool,
}

impl SqliteQueue {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// List the messages waiting on a queue, oldest first.
  pub async fn messages(&self, queue_name: &str) -> Result<Vec<StoredMessage>, Error> {
    let messages = sqlx::query_as(
      r#"
            SELECT message_id, queue_name, payload, enqueued_at
            FROM queue_messages
            WHERE queue_name = ?
            ORDER BY enqueued_at ASC
            "#,
    )
    .bind(queue_name)
    .fetch_all(&self.pool)
    .await?;

    Ok(messages)
  }
}

#[async_trait]
impl Queue for SqliteQueue {
  async fn send(&self, queue_name: &str, message: &QueueMessage) -> Result<String, Error> {
    let message_id = uuid::Uuid::new_v4().to_string();
    let payload = serde_json::to_string(message)?;

    sqlx::query(
      r#"
            INSERT INTO queue_messages (message_id, queue_name, payload, enqueued_at)
            VALUES (?, ?, ?, ?)
            "#,
    )
    .bind(&message_id)
    .bind(queue_name)
    .bind(payload)
    .bind(message.enqueued_at)
    .execute(&self.pool)
    .await?;

    debug!(
      queue = queue_name,
      message_id = %message_id,
      execution_id = %message.execution_id,
      "message published"
    );

    Ok(message_id)
  }
}
