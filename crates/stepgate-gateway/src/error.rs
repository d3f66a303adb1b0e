//! Gateway errors.

/// Errors that can occur while admitting a workflow or reading its status.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
  /// The request body did not match any known action.
  #[error("invalid request: {message}")]
  InvalidRequest { message: String },

  /// No active definition exists for the requested name.
  #[error("workflow not found: {name}")]
  WorkflowNotFound { name: String },

  /// Declared required fields are absent from the trigger data.
  #[error("missing required fields for workflow '{workflow}': {}", .fields.join(", "))]
  MissingRequiredFields {
    workflow: String,
    fields: Vec<String>,
  },

  /// Step templates reference caller data that was not supplied.
  #[error("missing template variables for workflow '{workflow}': {}", .variables.join(", "))]
  MissingTemplateVariables {
    workflow: String,
    variables: Vec<String>,
  },

  /// The correlation id already belongs to an execution of another workflow.
  #[error(
    "correlation id '{correlation_id}' is already used by workflow '{existing_workflow}', not '{workflow}'"
  )]
  CorrelationConflict {
    correlation_id: String,
    workflow: String,
    existing_workflow: String,
  },

  /// No execution exists with the requested id.
  #[error("execution not found: {execution_id}")]
  ExecutionNotFound { execution_id: String },

  /// The store failed.
  #[error("store error: {0}")]
  Store(#[from] stepgate_store::Error),

  /// Publishing failed; the execution row has been rolled back.
  #[error("failed to enqueue execution '{execution_id}': {source}")]
  Publish {
    execution_id: String,
    #[source]
    source: stepgate_queue::Error,
  },

  /// Publishing did not finish in time; the execution row has been rolled back.
  #[error("enqueue of execution '{execution_id}' timed out after {timeout_ms}ms")]
  PublishTimeout { execution_id: String, timeout_ms: u64 },
}

impl GatewayError {
  /// Whether the caller can fix the request and try again.
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      GatewayError::InvalidRequest { .. }
        | GatewayError::WorkflowNotFound { .. }
        | GatewayError::MissingRequiredFields { .. }
        | GatewayError::MissingTemplateVariables { .. }
        | GatewayError::ExecutionNotFound { .. }
        | GatewayError::CorrelationConflict { .. }
    )
  }

  pub fn is_conflict(&self) -> bool {
    matches!(self, GatewayError::CorrelationConflict { .. })
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      GatewayError::WorkflowNotFound { .. } | GatewayError::ExecutionNotFound { .. }
    )
  }
}
