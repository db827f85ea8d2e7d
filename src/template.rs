//! `${dotted.path}` placeholder resolution.
//!
//! Templates are resolved against a [`Context`] right before a node runs.
//! Strings have their placeholders substituted, mappings and sequences are
//! resolved element by element, and every other value passes through
//! untouched. A placeholder whose path is missing aborts the whole
//! resolution; nothing is partially substituted.

use crate::context::Context;
use crate::error::WorkflowError;
use crate::value::display_string;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Resolves every placeholder nested inside `value`.
///
/// ```
/// use nagare::{template, Context};
/// use serde_json::json;
///
/// let mut ctx = Context::default();
/// ctx.insert("user", json!({"name": "Ada"}));
///
/// let resolved = template::resolve(&json!("Hello ${user.name}"), &ctx)?;
/// assert_eq!(resolved, json!("Hello Ada"));
/// # Ok::<(), nagare::WorkflowError>(())
/// ```
pub fn resolve(value: &Value, ctx: &Context) -> Result<Value, WorkflowError> {
    match value {
        Value::String(text) => resolve_str(text, ctx).map(Value::String),
        Value::Array(items) => items
            .iter()
            .map(|item| resolve(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut resolved = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                resolved.insert(key.clone(), resolve(item, ctx)?);
            }
            Ok(Value::Object(resolved))
        }
        other => Ok(other.clone()),
    }
}

/// Substitutes the placeholders of a single string.
///
/// Non-string values found at a path are inserted in their canonical
/// string form (see [`display_string`]).
pub fn resolve_str(text: &str, ctx: &Context) -> Result<String, WorkflowError> {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(path)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let found = ctx
            .lookup(path.as_str())
            .ok_or_else(|| WorkflowError::PathNotFound {
                path: path.as_str().to_string(),
            })?;

        output.push_str(&text[last..whole.start()]);
        output.push_str(&display_string(found));
        last = whole.end();
    }

    output.push_str(&text[last..]);
    Ok(output)
}
