use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use stepgate_config::WorkflowDef;

use crate::{Error, Store, WorkflowDefinition, WorkflowExecution};

const DEFINITION_COLUMNS: &str =
  "name, version, steps, required_fields, visibility_timeout, max_retries, active, created_at";

const EXECUTION_COLUMNS: &str = "id, workflow_name, workflow_version, status, current_step, total_steps, input_payload, context, correlation_id, triggered_by, created_at";

/// Open a SQLite pool for `database_url`.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, Error> {
  let options = SqliteConnectOptions::from_str(database_url)?
    .create_if_missing(true)
    .foreign_keys(true);

  let pool = if database_url.contains(":memory:") {
    SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect_with(options)
      .await?
  } else {
    SqlitePoolOptions::new()
      .max_connections(8)
      .connect_with(options)
      .await?
  };

  Ok(pool)
}

/// SQLite-based store implementation.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// The underlying pool, shared with the queue.
  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), Error> {
    sqlx::migrate!("../../migrations").run(&self.pool).await?;
    Ok(())
  }
}

fn is_unique_violation(err: &sqlx::Error, column: &str) -> bool {
  match err {
    sqlx::Error::Database(db) => db.is_unique_violation() && db.message().contains(column),
    _ => false,
  }
}

#[async_trait]
impl Store for SqliteStore {
  async fn register_definition(&self, def: &WorkflowDef) -> Result<WorkflowDefinition, Error> {
    let mut tx = self.pool.begin().await?;

    let version = match def.version {
      Some(version) => version,
      None => {
        let latest: Option<i64> =
          sqlx::query_scalar("SELECT MAX(version) FROM workflow_definitions WHERE name = ?")
            .bind(&def.name)
            .fetch_one(&mut *tx)
            .await?;
        latest.unwrap_or(0) + 1
      }
    };

    sqlx::query("UPDATE workflow_definitions SET active = 0 WHERE name = ? AND active = 1")
      .bind(&def.name)
      .execute(&mut *tx)
      .await?;

    let definition = WorkflowDefinition {
      name: def.name.clone(),
      version,
      steps: Json(def.steps.clone()),
      required_fields: Json(def.required_fields.clone()),
      visibility_timeout: i64::from(def.visibility_timeout),
      max_retries: i64::from(def.max_retries),
      active: true,
      created_at: Utc::now(),
    };

    sqlx::query(&format!(
      "INSERT INTO workflow_definitions ({DEFINITION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&definition.name)
    .bind(definition.version)
    .bind(&definition.steps)
    .bind(&definition.required_fields)
    .bind(definition.visibility_timeout)
    .bind(definition.max_retries)
    .bind(definition.active)
    .bind(definition.created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
      if is_unique_violation(&e, "workflow_definitions.version") {
        Error::VersionConflict {
          name: definition.name.clone(),
          version,
        }
      } else {
        Error::Database(e)
      }
    })?;

    tx.commit().await?;

    Ok(definition)
  }

  async fn find_active_definition(&self, name: &str) -> Result<WorkflowDefinition, Error> {
    sqlx::query_as(&format!(
      "SELECT {DEFINITION_COLUMNS} FROM workflow_definitions WHERE name = ? AND active = 1"
    ))
    .bind(name)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("workflow '{}'", name)))
  }

  async fn create_execution(&self, execution: &WorkflowExecution) -> Result<(), Error> {
    sqlx::query(&format!(
      "INSERT INTO workflow_executions ({EXECUTION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&execution.id)
    .bind(&execution.workflow_name)
    .bind(execution.workflow_version)
    .bind(execution.status)
    .bind(execution.current_step)
    .bind(execution.total_steps)
    .bind(&execution.input_payload)
    .bind(&execution.context)
    .bind(&execution.correlation_id)
    .bind(&execution.triggered_by)
    .bind(execution.created_at)
    .execute(&self.pool)
    .await
    .map_err(|e| {
      if is_unique_violation(&e, "workflow_executions.correlation_id") {
        Error::DuplicateCorrelationId(execution.correlation_id.clone())
      } else {
        Error::Database(e)
      }
    })?;

    Ok(())
  }

  async fn get_execution(&self, execution_id: &str) -> Result<WorkflowExecution, Error> {
    sqlx::query_as(&format!(
      "SELECT {EXECUTION_COLUMNS} FROM workflow_executions WHERE id = ?"
    ))
    .bind(execution_id)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("execution '{}'", execution_id)))
  }

  async fn find_execution_by_correlation_id(
    &self,
    correlation_id: &str,
  ) -> Result<Option<WorkflowExecution>, Error> {
    let execution = sqlx::query_as(&format!(
      "SELECT {EXECUTION_COLUMNS} FROM workflow_executions WHERE correlation_id = ?"
    ))
    .bind(correlation_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(execution)
  }

  async fn delete_execution(&self, execution_id: &str) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM workflow_executions WHERE id = ?")
      .bind(execution_id)
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      return Err(Error::NotFound(format!("execution '{}'", execution_id)));
    }

    Ok(())
  }

  async fn list_executions(&self, workflow_name: &str) -> Result<Vec<WorkflowExecution>, Error> {
    let executions = sqlx::query_as(&format!(
      "SELECT {EXECUTION_COLUMNS} FROM workflow_executions WHERE workflow_name = ? ORDER BY created_at DESC"
    ))
    .bind(workflow_name)
    .fetch_all(&self.pool)
    .await?;

    Ok(executions)
  }
}
