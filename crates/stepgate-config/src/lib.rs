//! Stepgate Config
//!
//! This crate contains the serializable workflow definition types for stepgate.
//! These types describe a workflow as an author writes it: an ordered list of
//! templated steps plus the admission policy (required input fields, visibility
//! timeout, retry ceiling).
//!
//! Definitions can be loaded from:
//! - JSON files (via CLI with `stepgate definitions load workflows.json`)
//! - Database storage (as JSON blobs, see `stepgate-store`)
//!
//! The gateway never mutates a definition. It validates trigger input against
//! one and copies its steps into the queued unit of work.

mod error;
mod step;
mod workflow;

pub use error::ConfigError;
pub use step::StepDef;
pub use workflow::{
  DEFAULT_MAX_RETRIES, DEFAULT_VISIBILITY_TIMEOUT_SECS, WorkflowDef, parse_definitions,
};
