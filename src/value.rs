//! Helpers over the untyped value model shared by the normalizer, the
//! template resolver and the linter.

use serde_json::Value;

/// Returns the canonical string form of a value.
///
/// Strings are returned verbatim; everything else is rendered as compact
/// JSON (`42`, `true`, `null`, `{"a":1}`).
///
/// ```
/// use nagare::value::display_string;
/// use serde_json::json;
///
/// assert_eq!(display_string(&json!("Ada")), "Ada");
/// assert_eq!(display_string(&json!(3)), "3");
/// assert_eq!(display_string(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
/// ```
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Document truthiness: `null`, `false`, zero, and empty strings,
/// sequences and mappings are false. A missing value is false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map_or(true, |n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}
