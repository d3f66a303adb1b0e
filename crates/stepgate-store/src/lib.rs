//! Stepgate Store
//!
//! This crate provides the storage trait and implementations for workflow
//! definitions and executions. Data is persisted to SQLite through `sqlx`.
//!
//! The [`Store`] trait defines operations for:
//! - Registering definitions and looking up the active one by name
//! - Recording new executions and finding them by correlation id
//! - Reading execution state back for status queries
//! - Deleting an execution when its enqueue has to be rolled back

mod sqlite;
mod types;

pub use sqlite::{SqliteStore, connect};
pub use sqlx::types::Json;
pub use types::{ExecutionStatus, WorkflowDefinition, WorkflowExecution};

use async_trait::async_trait;
use stepgate_config::WorkflowDef;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// Another execution already holds this correlation id.
  #[error("duplicate correlation id: {0}")]
  DuplicateCorrelationId(String),

  /// A definition with this name and version is already registered.
  #[error("workflow '{name}' version {version} already exists")]
  VersionConflict { name: String, version: i64 },

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Applying migrations failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Storage trait for workflow definitions and executions.
#[async_trait]
pub trait Store: Send + Sync {
  /// Register a definition as the active version for its name.
  ///
  /// Previously active versions of the same name are deactivated in the same
  /// transaction.
  async fn register_definition(&self, def: &WorkflowDef) -> Result<WorkflowDefinition, Error>;

  /// Get the active definition for a workflow name.
  ///
  /// Unknown and inactive names both return [`Error::NotFound`].
  async fn find_active_definition(&self, name: &str) -> Result<WorkflowDefinition, Error>;

  /// Create a new workflow execution.
  ///
  /// Returns [`Error::DuplicateCorrelationId`] if the correlation id is taken.
  async fn create_execution(&self, execution: &WorkflowExecution) -> Result<(), Error>;

  /// Get a workflow execution by ID.
  async fn get_execution(&self, execution_id: &str) -> Result<WorkflowExecution, Error>;

  /// Find the execution recorded for a correlation id, if any.
  async fn find_execution_by_correlation_id(
    &self,
    correlation_id: &str,
  ) -> Result<Option<WorkflowExecution>, Error>;

  /// Delete a workflow execution.
  async fn delete_execution(&self, execution_id: &str) -> Result<(), Error>;

  /// List executions for a workflow, newest first.
  async fn list_executions(&self, workflow_name: &str) -> Result<Vec<WorkflowExecution>, Error>;
}
