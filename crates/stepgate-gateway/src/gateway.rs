//! Gateway implementation.

use std::sync::Arc;

use stepgate_queue::{Queue, QueueMessage};
use stepgate_store::{Error as StoreError, Store, WorkflowDefinition, WorkflowExecution};
use stepgate_template::{check_required_fields, validate_template_variables};
use tracing::{debug, error, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::correlation::synthesize_correlation_id;
use crate::error::GatewayError;
use crate::message::snapshot_message;
use crate::request::{EnqueueRequest, EnqueueResponse, Request, Response};

/// Admits workflow triggers and reports execution status.
///
/// Holds only shared handles; every call is independent.
#[derive(Clone)]
pub struct Gateway {
  store: Arc<dyn Store>,
  queue: Arc<dyn Queue>,
  config: GatewayConfig,
}

impl Gateway {
  pub fn new(store: Arc<dyn Store>, queue: Arc<dyn Queue>, config: GatewayConfig) -> Self {
    Self {
      store,
      queue,
      config,
    }
  }

  pub fn config(&self) -> &GatewayConfig {
    &self.config
  }

  /// Dispatch a parsed request.
  pub async fn handle(&self, request: Request, triggered_by: &str) -> Result<Response, GatewayError> {
    match request {
      Request::Enqueue(enqueue) => self
        .enqueue(enqueue, triggered_by)
        .await
        .map(Response::Enqueued),
      Request::Status(status) => {
        let execution = self.status(&status.execution_id).await?;
        Ok(Response::Status {
          execution: Box::new(execution),
        })
      }
      Request::Health(_) => Ok(Response::Health { status: "ok" }),
    }
  }

  /// Admit a workflow trigger.
  ///
  /// Validation failures return before anything is written. A replayed
  /// correlation id returns the existing execution with `duplicate = true`.
  #[instrument(
    name = "gateway_enqueue",
    skip(self, request, triggered_by),
    fields(workflow = %request.workflow, triggered_by = %triggered_by)
  )]
  pub async fn enqueue(
    &self,
    request: EnqueueRequest,
    triggered_by: &str,
  ) -> Result<EnqueueResponse, GatewayError> {
    request.validate()?;

    let definition = self.active_definition(&request.workflow).await?;

    let missing = check_required_fields(&definition.required_fields.0, &request.data);
    if !missing.is_empty() {
      warn!(missing = ?missing, "rejected: missing required fields");
      return Err(GatewayError::MissingRequiredFields {
        workflow: definition.name,
        fields: missing,
      });
    }

    let validation = validate_template_variables(&definition.steps.0, &request.data);
    if !validation.valid {
      warn!(missing = ?validation.missing, "rejected: missing template variables");
      return Err(GatewayError::MissingTemplateVariables {
        workflow: definition.name,
        variables: validation.missing,
      });
    }
    debug!(runtime_vars = ?validation.runtime_vars, "runtime variables deferred to executor");

    let correlation_id = match request.correlation_id {
      Some(correlation_id) => {
        if let Some(existing) = self
          .store
          .find_execution_by_correlation_id(&correlation_id)
          .await?
        {
          info!(execution_id = %existing.id, correlation_id = %correlation_id, "replay of existing execution");
          return replay(existing, &definition.name);
        }
        correlation_id
      }
      None => synthesize_correlation_id(&definition.name),
    };

    let execution = WorkflowExecution::pending(
      uuid::Uuid::new_v4().to_string(),
      &definition,
      request.data.clone(),
      correlation_id,
      triggered_by,
    );

    match self.store.create_execution(&execution).await {
      Ok(()) => {}
      Err(StoreError::DuplicateCorrelationId(correlation_id)) => {
        // A concurrent request with the same correlation id inserted first.
        let existing = self
          .store
          .find_execution_by_correlation_id(&correlation_id)
          .await?
          .ok_or_else(|| {
            StoreError::NotFound(format!("execution for correlation id '{}'", correlation_id))
          })?;
        info!(execution_id = %existing.id, correlation_id = %correlation_id, "replay detected on insert");
        return replay(existing, &definition.name);
      }
      Err(e) => {
        error!(error = %e, "failed to record execution");
        return Err(e.into());
      }
    }

    let message = snapshot_message(&execution, &definition, request.data);
    let message_id = self.publish(&execution, &message).await?;

    info!(
      execution_id = %execution.id,
      message_id = %message_id,
      version = execution.workflow_version,
      total_steps = execution.total_steps,
      "execution queued"
    );

    Ok(EnqueueResponse::queued(&execution))
  }

  /// Read the persisted state of an execution.
  #[instrument(name = "gateway_status", skip(self))]
  pub async fn status(&self, execution_id: &str) -> Result<WorkflowExecution, GatewayError> {
    match self.store.get_execution(execution_id).await {
      Ok(execution) => Ok(execution),
      Err(StoreError::NotFound(_)) => Err(GatewayError::ExecutionNotFound {
        execution_id: execution_id.to_string(),
      }),
      Err(e) => Err(e.into()),
    }
  }

  async fn active_definition(&self, name: &str) -> Result<WorkflowDefinition, GatewayError> {
    match self.store.find_active_definition(name).await {
      Ok(definition) => Ok(definition),
      Err(StoreError::NotFound(_)) => {
        warn!("rejected: workflow not found");
        Err(GatewayError::WorkflowNotFound {
          name: name.to_string(),
        })
      }
      Err(e) => Err(e.into()),
    }
  }

  /// Publish the message, deleting the execution row if that fails.
  async fn publish(
    &self,
    execution: &WorkflowExecution,
    message: &QueueMessage,
  ) -> Result<String, GatewayError> {
    let send = self.queue.send(&self.config.queue_name, message);

    let err = match tokio::time::timeout(self.config.publish_timeout, send).await {
      Ok(Ok(message_id)) => return Ok(message_id),
      Ok(Err(source)) => GatewayError::Publish {
        execution_id: execution.id.clone(),
        source,
      },
      Err(_) => GatewayError::PublishTimeout {
        execution_id: execution.id.clone(),
        timeout_ms: self.config.publish_timeout.as_millis() as u64,
      },
    };

    error!(execution_id = %execution.id, error = %err, "publish failed, rolling back execution");
    self.rollback(&execution.id).await;

    Err(err)
  }

  async fn rollback(&self, execution_id: &str) {
    match self.store.delete_execution(execution_id).await {
      Ok(()) => {
        warn!(execution_id = %execution_id, "execution rolled back");
      }
      Err(e) => {
        error!(
          execution_id = %execution_id,
          error = %e,
          "rollback failed, pending execution has no queued message"
        );
      }
    }
  }
}

/// Answer a replay, refusing one whose correlation id was recorded for a
/// different workflow.
fn replay(existing: WorkflowExecution, workflow: &str) -> Result<EnqueueResponse, GatewayError> {
  if existing.workflow_name != workflow {
    warn!(
      execution_id = %existing.id,
      correlation_id = %existing.correlation_id,
      existing_workflow = %existing.workflow_name,
      "rejected: correlation id belongs to another workflow"
    );
    return Err(GatewayError::CorrelationConflict {
      correlation_id: existing.correlation_id,
      workflow: workflow.to_string(),
      existing_workflow: existing.workflow_name,
    });
  }

  Ok(EnqueueResponse::replay(&existing))
}
