//! Step specifications.
//!
//! A step is an opaque, templated call specification. The gateway does not
//! interpret it beyond scanning its strings for `{{ ... }}` placeholders.
//!
//! # Examples
//!
//! ```json
//! {
//!   "action": "send_email",
//!   "to": "{{email}}",
//!   "body": { "greeting": "Hello {{profile.first_name}}" },
//!   "reply_to": "{{step_0_result.message_id}}"
//! }
//! ```
//!
//! Two placeholder namespaces exist:
//! - caller data (`{{email}}`, `{{profile.first_name}}`), checked at admission
//! - runtime step results (`{{step_0_result.message_id}}`), filled in by the
//!   executor once the referenced step has completed

/// A step is any JSON value; placeholders may appear in any nested string.
pub type StepDef = serde_json::Value;
