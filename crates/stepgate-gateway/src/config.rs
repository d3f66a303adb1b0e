use std::time::Duration;

/// Queue the gateway publishes to unless configured otherwise.
pub const DEFAULT_QUEUE_NAME: &str = "workflow_executions";

/// How long a publish may take before it is treated as failed.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
  /// Name of the queue admitted executions are published to.
  pub queue_name: String,
  /// Upper bound on a single publish. Exceeding it triggers the same
  /// rollback as a publish error.
  pub publish_timeout: Duration,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      queue_name: DEFAULT_QUEUE_NAME.to_string(),
      publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
    }
  }
}
