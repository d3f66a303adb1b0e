use serde_json::{Map, Value};

/// Whether a looked-up value counts as not supplied.
///
/// A missing key and an explicit `null` are absent. Every other value is
/// present, including `0`, `false`, `""`, `[]` and `{}`.
pub fn is_absent(value: Option<&Value>) -> bool {
  matches!(value, None | Some(Value::Null))
}

/// Return the declared required fields that `data` does not supply, in
/// declaration order.
pub fn check_required_fields(required: &[String], data: &Map<String, Value>) -> Vec<String> {
  required
    .iter()
    .filter(|field| is_absent(data.get(field.as_str())))
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn data(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
  }

  fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
  }

  #[test]
  fn test_missing_field_reported() {
    let missing = check_required_fields(&fields(&["email"]), &Map::new());
    assert_eq!(missing, vec!["email"]);
  }

  #[test]
  fn test_all_missing_reported_in_order() {
    let missing = check_required_fields(
      &fields(&["email", "name", "plan"]),
      &data(json!({ "name": "Ann" })),
    );
    assert_eq!(missing, vec!["email", "plan"]);
  }

  #[test]
  fn test_falsy_values_are_present() {
    let missing = check_required_fields(
      &fields(&["zero", "no", "empty", "list", "obj"]),
      &data(json!({ "zero": 0, "no": false, "empty": "", "list": [], "obj": {} })),
    );
    assert!(missing.is_empty());
  }

  #[test]
  fn test_null_is_absent() {
    let missing = check_required_fields(&fields(&["email"]), &data(json!({ "email": null })));
    assert_eq!(missing, vec!["email"]);
  }

  #[test]
  fn test_no_required_fields() {
    assert!(check_required_fields(&[], &Map::new()).is_empty());
  }
}
