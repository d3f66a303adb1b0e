//! Stepgate Template
//!
//! Admission-time checks over workflow step templates and trigger input.
//!
//! Steps reference values with `{{name}}` placeholders where `name` may be a
//! dotted path (`{{profile.email}}`). Placeholders are never rendered here;
//! the executor renders them once the values exist. This crate only answers
//! whether the caller supplied everything it is responsible for:
//!
//! - [`extract_template_variables`] collects every placeholder in a value
//! - [`validate_template_variables`] resolves caller placeholders against the
//!   trigger data and reports all that are missing in one pass
//! - [`check_required_fields`] checks a definition's declared input keys

mod extract;
mod required;
mod validate;

pub use extract::extract_template_variables;
pub use required::{check_required_fields, is_absent};
pub use validate::{
  TemplateValidation, is_runtime_variable, resolve_path, validate_template_variables,
};
