//! Request and response shapes for the single gateway endpoint.
//!
//! Requests are a closed union keyed by `action`:
//!
//! ```json
//! { "action": "enqueue", "payload": { "workflow": "send_welcome_email", "data": { "email": "ann@example.com" } } }
//! { "action": "status",  "payload": { "execution_id": "..." } }
//! { "action": "health" }
//! ```
//!
//! `health` takes no payload; one may be sent and is ignored.
//!
//! A body is parsed and checked here before any lookup or write happens.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stepgate_store::{ExecutionStatus, WorkflowExecution};

use crate::error::GatewayError;

/// A gateway request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum Request {
  Enqueue(EnqueueRequest),
  Status(StatusRequest),
  Health(Option<Value>),
}

impl Request {
  /// Parse and check a raw request body.
  pub fn from_slice(body: &[u8]) -> Result<Self, GatewayError> {
    let request: Request =
      serde_json::from_slice(body).map_err(|e| GatewayError::InvalidRequest {
        message: e.to_string(),
      })?;
    request.validate()?;
    Ok(request)
  }

  fn validate(&self) -> Result<(), GatewayError> {
    match self {
      Request::Enqueue(enqueue) => enqueue.validate(),
      Request::Status(status) => status.validate(),
      Request::Health(_) => Ok(()),
    }
  }
}

/// Trigger a workflow.
///
/// `correlation_id` is the idempotency key. A second request with the same
/// id returns the first execution instead of creating another. When it is
/// omitted a unique id is generated, so repeated requests without one always
/// create new executions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnqueueRequest {
  pub workflow: String,
  #[serde(default)]
  pub data: Map<String, Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub correlation_id: Option<String>,
}

impl EnqueueRequest {
  pub fn new(workflow: impl Into<String>, data: Map<String, Value>) -> Self {
    Self {
      workflow: workflow.into(),
      data,
      correlation_id: None,
    }
  }

  pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
    self.correlation_id = Some(correlation_id.into());
    self
  }

  pub(crate) fn validate(&self) -> Result<(), GatewayError> {
    if self.workflow.trim().is_empty() {
      return Err(GatewayError::InvalidRequest {
        message: "workflow must not be empty".to_string(),
      });
    }
    if let Some(id) = &self.correlation_id
      && id.trim().is_empty()
    {
      return Err(GatewayError::InvalidRequest {
        message: "correlation_id must not be empty when provided".to_string(),
      });
    }
    Ok(())
  }
}

/// Read the persisted state of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusRequest {
  pub execution_id: String,
}

impl StatusRequest {
  pub(crate) fn validate(&self) -> Result<(), GatewayError> {
    if self.execution_id.trim().is_empty() {
      return Err(GatewayError::InvalidRequest {
        message: "execution_id must not be empty".to_string(),
      });
    }
    Ok(())
  }
}

/// Label reported to callers for an admitted execution.
///
/// The persisted row is `pending`; `queued` tells the caller its unit of work
/// is on the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
  Queued,
}

/// Status reported by an enqueue response.
///
/// A fresh admission reports `queued`. A replay reports the stored status of
/// the execution it matched, so a retry after completion sees `succeeded` or
/// `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnqueueStatus {
  Admission(AdmissionStatus),
  Execution(ExecutionStatus),
}

impl EnqueueStatus {
  pub const QUEUED: Self = Self::Admission(AdmissionStatus::Queued);
}

impl From<ExecutionStatus> for EnqueueStatus {
  fn from(status: ExecutionStatus) -> Self {
    Self::Execution(status)
  }
}

/// Result of an enqueue request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnqueueResponse {
  pub execution_id: String,
  pub workflow_name: String,
  pub status: EnqueueStatus,
  pub total_steps: i64,
  /// True when the correlation id matched an existing execution and nothing
  /// new was created.
  pub duplicate: bool,
}

impl EnqueueResponse {
  pub(crate) fn queued(execution: &WorkflowExecution) -> Self {
    Self::from_execution(execution, EnqueueStatus::QUEUED, false)
  }

  pub(crate) fn replay(execution: &WorkflowExecution) -> Self {
    Self::from_execution(execution, execution.status.into(), true)
  }

  fn from_execution(execution: &WorkflowExecution, status: EnqueueStatus, duplicate: bool) -> Self {
    Self {
      execution_id: execution.id.clone(),
      workflow_name: execution.workflow_name.clone(),
      status,
      total_steps: execution.total_steps,
      duplicate,
    }
  }
}

/// Result of any gateway request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
  Enqueued(EnqueueResponse),
  Status { execution: Box<WorkflowExecution> },
  Health { status: &'static str },
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn parse(value: Value) -> Result<Request, GatewayError> {
    Request::from_slice(value.to_string().as_bytes())
  }

  #[test]
  fn test_parse_enqueue() {
    let request = parse(json!({
      "action": "enqueue",
      "payload": {
        "workflow": "send_welcome_email",
        "data": { "email": "ann@example.com" },
        "correlation_id": "signup-42"
      }
    }))
    .unwrap();

    let Request::Enqueue(enqueue) = request else {
      panic!("expected enqueue request");
    };
    assert_eq!(enqueue.workflow, "send_welcome_email");
    assert_eq!(enqueue.data["email"], "ann@example.com");
    assert_eq!(enqueue.correlation_id.as_deref(), Some("signup-42"));
  }

  #[test]
  fn test_parse_enqueue_defaults() {
    let request = parse(json!({ "action": "enqueue", "payload": { "workflow": "w" } })).unwrap();

    assert_eq!(
      request,
      Request::Enqueue(EnqueueRequest::new("w", Map::new()))
    );
  }

  #[test]
  fn test_parse_status_and_health() {
    let status = parse(json!({ "action": "status", "payload": { "execution_id": "abc" } })).unwrap();
    assert_eq!(
      status,
      Request::Status(StatusRequest {
        execution_id: "abc".to_string()
      })
    );

    let health = parse(json!({ "action": "health" })).unwrap();
    assert_eq!(health, Request::Health(None));
  }

  #[test]
  fn test_parse_health_ignores_payload() {
    let empty = parse(json!({ "action": "health", "payload": {} })).unwrap();
    assert!(matches!(empty, Request::Health(_)));

    let null = parse(json!({ "action": "health", "payload": null })).unwrap();
    assert_eq!(null, Request::Health(None));
  }

  #[test]
  fn test_enqueue_status_serializes_as_plain_label() {
    assert_eq!(serde_json::to_value(EnqueueStatus::QUEUED).unwrap(), json!("queued"));
    assert_eq!(
      serde_json::to_value(EnqueueStatus::from(ExecutionStatus::Failed)).unwrap(),
      json!("failed")
    );
  }

  #[test]
  fn test_reject_unknown_action() {
    let result = parse(json!({ "action": "delete", "payload": {} }));
    assert!(matches!(result, Err(GatewayError::InvalidRequest { .. })));
  }

  #[test]
  fn test_reject_missing_action() {
    let result = parse(json!({ "payload": { "workflow": "w" } }));
    assert!(matches!(result, Err(GatewayError::InvalidRequest { .. })));
  }

  #[test]
  fn test_reject_non_object_data() {
    let result = parse(json!({
      "action": "enqueue",
      "payload": { "workflow": "w", "data": [1, 2, 3] }
    }));
    assert!(matches!(result, Err(GatewayError::InvalidRequest { .. })));
  }

  #[test]
  fn test_reject_unknown_payload_fields() {
    let result = parse(json!({
      "action": "enqueue",
      "payload": { "workflow": "w", "wrokflow_data": {} }
    }));
    assert!(matches!(result, Err(GatewayError::InvalidRequest { .. })));
  }

  #[test]
  fn test_reject_blank_identifiers() {
    let blank_workflow = parse(json!({ "action": "enqueue", "payload": { "workflow": " " } }));
    assert!(matches!(blank_workflow, Err(GatewayError::InvalidRequest { .. })));

    let blank_correlation = parse(json!({
      "action": "enqueue",
      "payload": { "workflow": "w", "correlation_id": "" }
    }));
    assert!(matches!(blank_correlation, Err(GatewayError::InvalidRequest { .. })));

    let blank_execution = parse(json!({ "action": "status", "payload": { "execution_id": "" } }));
    assert!(matches!(blank_execution, Err(GatewayError::InvalidRequest { .. })));
  }

  #[test]
  fn test_reject_malformed_json() {
    let result = Request::from_slice(b"{\"action\":");
    assert!(matches!(result, Err(GatewayError::InvalidRequest { .. })));
  }

  #[test]
  fn test_health_response_shape() {
    let value = serde_json::to_value(Response::Health { status: "ok" }).unwrap();
    assert_eq!(value, json!({ "status": "ok" }));
  }
}
