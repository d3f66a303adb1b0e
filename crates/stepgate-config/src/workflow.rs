use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::step::StepDef;

/// Visibility timeout applied when a definition does not declare one.
pub const DEFAULT_VISIBILITY_TIMEOUT_SECS: u32 = 300;

/// Retry ceiling applied when a definition does not declare one.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A workflow definition as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  pub name: String,
  /// Explicit version. When omitted the store assigns the next version for
  /// this name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<i64>,
  pub steps: Vec<StepDef>,
  /// Top-level input keys every trigger must supply.
  #[serde(default)]
  pub required_fields: Vec<String>,
  /// Seconds a dequeued message stays invisible to other consumers.
  #[serde(default = "default_visibility_timeout")]
  pub visibility_timeout: u32,
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
}

fn default_visibility_timeout() -> u32 {
  DEFAULT_VISIBILITY_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
  DEFAULT_MAX_RETRIES
}

impl WorkflowDef {
  /// Check the definition is usable before it is registered.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.name.trim().is_empty() {
      return Err(self.invalid("name must not be empty"));
    }
    if self.steps.is_empty() {
      return Err(self.invalid("at least one step is required"));
    }
    if let Some(version) = self.version
      && version < 1
    {
      return Err(self.invalid(format!("version must be positive, got {}", version)));
    }
    if self.required_fields.iter().any(|f| f.trim().is_empty()) {
      return Err(self.invalid("required field names must not be empty"));
    }
    Ok(())
  }

  fn invalid(&self, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
      name: self.name.clone(),
      message: message.into(),
    }
  }
}

/// A definitions document holds either one definition or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionDocument {
  Many(Vec<WorkflowDef>),
  One(Box<WorkflowDef>),
}

/// Parse and validate a definitions document.
pub fn parse_definitions(content: &str) -> Result<Vec<WorkflowDef>, ConfigError> {
  let defs = match serde_json::from_str::<DefinitionDocument>(content)? {
    DefinitionDocument::Many(defs) => defs,
    DefinitionDocument::One(def) => vec![*def],
  };

  for def in &defs {
    def.validate()?;
  }

  Ok(defs)
}
