use chrono::Utc;

/// Build a correlation id for a request that did not supply one.
///
/// The id embeds a fresh UUID, so it never matches an existing execution.
/// Callers that want deduplication must pass a stable id of their own.
pub fn synthesize_correlation_id(workflow: &str) -> String {
  format!(
    "{}:{}:{}",
    workflow,
    Utc::now().timestamp_millis(),
    uuid::Uuid::new_v4()
  )
}
