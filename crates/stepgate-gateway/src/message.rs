use chrono::Utc;
use serde_json::{Map, Value};
use stepgate_queue::QueueMessage;
use stepgate_store::{WorkflowDefinition, WorkflowExecution};

/// Build the queued unit of work for a freshly recorded execution.
///
/// The step list is cloned out of `definition`; the message owns its copy.
pub fn snapshot_message(
  execution: &WorkflowExecution,
  definition: &WorkflowDefinition,
  data: Map<String, Value>,
) -> QueueMessage {
  QueueMessage {
    execution_id: execution.id.clone(),
    workflow_name: execution.workflow_name.clone(),
    workflow_version: execution.workflow_version,
    steps: definition.steps.0.clone(),
    current_step: execution.current_step,
    context: Value::Object(data),
    visibility_timeout: definition.visibility_timeout,
    max_retries: definition.max_retries,
    enqueued_at: Utc::now(),
  }
}
