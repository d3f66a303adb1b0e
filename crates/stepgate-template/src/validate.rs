use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::extract::extract_template_variables;
use crate::required::is_absent;

static RUNTIME_ROOT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^step_\d+_result$").expect("runtime root pattern is valid"));

/// Whether a placeholder names a prior step's result (`step_0_result.message_id`).
///
/// Only the first path segment is matched, and it must be exactly
/// `step_<N>_result`. The executor supplies these, so admission never checks
/// them. Caller names that merely start with `step_` (`step_count`) are not
/// runtime variables.
pub fn is_runtime_variable(name: &str) -> bool {
  let root = name.split('.').next().unwrap_or(name);
  RUNTIME_ROOT.is_match(root)
}

/// Outcome of checking a step list against trigger data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateValidation {
  pub valid: bool,
  /// Caller placeholders that did not resolve, sorted.
  pub missing: Vec<String>,
  /// Runtime placeholders that were skipped, sorted.
  pub runtime_vars: Vec<String>,
}

/// Check every caller placeholder across `steps` resolves in `data`.
///
/// All missing names are collected before returning.
pub fn validate_template_variables(steps: &[Value], data: &Map<String, Value>) -> TemplateValidation {
  let names: BTreeSet<String> = steps.iter().flat_map(extract_template_variables).collect();

  let mut missing = Vec::new();
  let mut runtime_vars = Vec::new();

  for name in names {
    if is_runtime_variable(&name) {
      runtime_vars.push(name);
    } else if is_absent(resolve_path(data, &name)) {
      missing.push(name);
    }
  }

  TemplateValidation {
    valid: missing.is_empty(),
    missing,
    runtime_vars,
  }
}

/// Resolve a dotted path against trigger data.
///
/// Segments index object keys, or array positions when the current value is
/// an array and the segment is a number. Returns `None` as soon as a segment
/// cannot be followed.
pub fn resolve_path<'a>(data: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
  let mut segments = path.split('.');
  let mut current = data.get(segments.next()?)?;

  for segment in segments {
    current = match current {
      Value::Object(map) => map.get(segment)?,
      Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
      _ => return None,
    };
  }

  Some(current)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn data(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
  }

  #[test]
  fn test_all_resolved() {
    let steps = vec![json!({ "to": "{{email}}", "name": "{{profile.first}}" })];
    let result = validate_template_variables(
      &steps,
      &data(json!({ "email": "ann@example.com", "profile": { "first": "Ann" } })),
    );

    assert!(result.valid);
    assert!(result.missing.is_empty());
    assert!(result.runtime_vars.is_empty());
  }

  #[test]
  fn test_reports_every_missing_name() {
    let steps = vec![
      json!({ "to": "{{email}}", "greeting": "Hi {{first_name}}" }),
      json!({ "plan": "{{account.plan}}", "again": "{{first_name}}" }),
    ];
    let result = validate_template_variables(&steps, &data(json!({ "email": "a@b.com" })));

    assert!(!result.valid);
    assert_eq!(result.missing, vec!["account.plan", "first_name"]);
  }

  #[test]
  fn test_runtime_variables_are_skipped() {
    let steps = vec![
      json!({ "to": "{{email}}" }),
      json!({ "reply_to": "{{step_0_result.id}}" }),
    ];
    let result = validate_template_variables(&steps, &data(json!({ "email": "a@b.com" })));

    assert!(result.valid);
    assert_eq!(result.runtime_vars, vec!["step_0_result.id"]);
  }

  #[test]
  fn test_step_prefixed_caller_names_are_checked() {
    let steps = vec![json!({
      "count": "{{step_count}}",
      "size": "{{step_size.value}}",
      "prior": "{{step_2_result.id}}",
    })];
    let result = validate_template_variables(&steps, &Map::new());

    assert!(!result.valid);
    assert_eq!(result.missing, vec!["step_count", "step_size.value"]);
    assert_eq!(result.runtime_vars, vec!["step_2_result.id"]);
  }

  #[test]
  fn test_is_runtime_variable() {
    assert!(is_runtime_variable("step_0_result"));
    assert!(is_runtime_variable("step_12_result.body.items.0"));
    assert!(!is_runtime_variable("step_count"));
    assert!(!is_runtime_variable("step_result.id"));
    assert!(!is_runtime_variable("step_x_result.id"));
    assert!(!is_runtime_variable("step_1_results.id"));
    assert!(!is_runtime_variable("my_step_1_result"));
  }

  #[test]
  fn test_partial_nested_path_is_missing() {
    let steps = vec![json!("{{profile.address.city}}")];
    let result =
      validate_template_variables(&steps, &data(json!({ "profile": { "name": "Ann" } })));

    assert_eq!(result.missing, vec!["profile.address.city"]);
  }

  #[test]
  fn test_path_through_scalar_is_missing() {
    let steps = vec![json!("{{email.domain}}")];
    let result = validate_template_variables(&steps, &data(json!({ "email": "a@b.com" })));

    assert_eq!(result.missing, vec!["email.domain"]);
  }

  #[test]
  fn test_falsy_leaf_values_resolve() {
    let steps = vec![json!(["{{count}}", "{{flag}}", "{{items}}"])];
    let result = validate_template_variables(
      &steps,
      &data(json!({ "count": 0, "flag": false, "items": [] })),
    );

    assert!(result.valid);
  }

  #[test]
  fn test_resolve_array_index() {
    let input = data(json!({ "items": [{ "sku": "A1" }, { "sku": "B2" }] }));

    assert_eq!(resolve_path(&input, "items.1.sku"), Some(&json!("B2")));
    assert_eq!(resolve_path(&input, "items.2.sku"), None);
    assert_eq!(resolve_path(&input, "items.first"), None);
  }

  #[test]
  fn test_no_steps_is_valid() {
    let result = validate_template_variables(&[], &Map::new());
    assert!(result.valid);
  }
}
