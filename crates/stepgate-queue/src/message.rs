use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A self-contained unit of work for one execution.
///
/// Everything the executor needs travels inside the message. `steps` is an
/// owned copy of the definition's step list taken at admission time, so edits
/// to the definition afterwards never reach an in-flight execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
  pub execution_id: String,
  pub workflow_name: String,
  pub workflow_version: i64,
  pub steps: Vec<serde_json::Value>,
  pub current_step: i64,
  /// Initial working context: the caller's input data.
  pub context: serde_json::Value,
  pub visibility_timeout: i64,
  pub max_retries: i64,
  pub enqueued_at: DateTime<Utc>,
}
