use thiserror::Error;

/// Errors raised while reading workflow definition documents.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The document is not valid JSON or does not match the definition shape.
  #[error("failed to parse workflow definitions: {0}")]
  Parse(#[from] serde_json::Error),

  /// The document parsed but describes an unusable definition.
  #[error("invalid workflow definition '{name}': {message}")]
  Invalid { name: String, message: String },
}
