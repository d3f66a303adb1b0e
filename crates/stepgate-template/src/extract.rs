use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\{\{\s*([^{}\s][^{}]*?)\s*\}\}").expect("placeholder pattern is valid")
});

/// Collect every `{{name}}` reference in a value.
///
/// Strings are scanned directly, arrays and object values are walked
/// recursively. Object keys are not scanned. The result is a set, so the
/// same name referenced many times appears once.
pub fn extract_template_variables(value: &Value) -> BTreeSet<String> {
  let mut names = BTreeSet::new();
  collect(value, &mut names);
  names
}

fn collect(value: &Value, names: &mut BTreeSet<String>) {
  match value {
    Value::String(s) => {
      for cap in PLACEHOLDER.captures_iter(s) {
        names.insert(cap[1].to_string());
      }
    }
    Value::Array(items) => {
      for item in items {
        collect(item, names);
      }
    }
    Value::Object(map) => {
      for item in map.values() {
        collect(item, names);
      }
    }
    Value::Null | Value::Bool(_) | Value::Number(_) => {}
  }
}
