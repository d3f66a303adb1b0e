use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Status of a workflow execution.
///
/// The gateway only ever writes `Pending`. Later transitions belong to the
/// executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Pending,
  Running,
  Succeeded,
  Failed,
}

/// A workflow definition as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkflowDefinition {
  pub name: String,
  pub version: i64,
  pub steps: Json<Vec<serde_json::Value>>,
  pub required_fields: Json<Vec<String>>,
  pub visibility_timeout: i64,
  pub max_retries: i64,
  pub active: bool,
  pub created_at: DateTime<Utc>,
}

impl WorkflowDefinition {
  pub fn step_count(&self) -> i64 {
    self.steps.0.len() as i64
  }
}

/// A workflow execution as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkflowExecution {
  pub id: String,
  pub workflow_name: String,
  pub workflow_version: i64,
  pub status: ExecutionStatus,
  pub current_step: i64,
  pub total_steps: i64,
  pub input_payload: Json<serde_json::Value>,
  pub context: Json<serde_json::Value>,
  pub correlation_id: String,
  pub triggered_by: String,
  pub created_at: DateTime<Utc>,
}

impl WorkflowExecution {
  /// Build the initial row for a new execution of `definition`.
  ///
  /// The version and step count are pinned here. The working context starts
  /// empty and is seeded by the executor from `input_payload`.
  pub fn pending(
    id: impl Into<String>,
    definition: &WorkflowDefinition,
    input: serde_json::Map<String, serde_json::Value>,
    correlation_id: impl Into<String>,
    triggered_by: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      workflow_name: definition.name.clone(),
      workflow_version: definition.version,
      status: ExecutionStatus::Pending,
      current_step: 0,
      total_steps: definition.step_count(),
      input_payload: Json(serde_json::Value::Object(input)),
      context: Json(serde_json::json!({})),
      correlation_id: correlation_id.into(),
      triggered_by: triggered_by.into(),
      created_at: Utc::now(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn definition() -> WorkflowDefinition {
    WorkflowDefinition {
      name: "onboard".to_string(),
      version: 4,
      steps: Json(vec![json!({ "to": "{{email}}" }), json!({ "id": "{{step_0_result.id}}" })]),
      required_fields: Json(vec!["email".to_string()]),
      visibility_timeout: 30,
      max_retries: 2,
      active: true,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn test_pending_execution_snapshot() {
    let input = json!({ "email": "ann@example.com" }).as_object().cloned().unwrap();
    let execution = WorkflowExecution::pending("exec-1", &definition(), input, "corr-1", "api");

    assert_eq!(execution.status, ExecutionStatus::Pending);
    assert_eq!(execution.workflow_version, 4);
    assert_eq!(execution.current_step, 0);
    assert_eq!(execution.total_steps, 2);
    assert_eq!(execution.input_payload.0["email"], "ann@example.com");
    assert_eq!(execution.context.0, json!({}));
  }

  #[test]
  fn test_status_serializes_snake_case() {
    assert_eq!(
      serde_json::to_value(ExecutionStatus::Succeeded).unwrap(),
      json!("succeeded")
    );
  }

  #[test]
  fn test_execution_serializes_json_columns_transparently() {
    let input = json!({ "email": "ann@example.com" }).as_object().cloned().unwrap();
    let execution = WorkflowExecution::pending("exec-1", &definition(), input, "corr-1", "api");

    let value = serde_json::to_value(&execution).unwrap();
    assert_eq!(value["input_payload"]["email"], "ann@example.com");
    assert_eq!(value["status"], "pending");
  }
}
