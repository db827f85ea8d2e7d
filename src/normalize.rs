//! Translation of the `states` dialect into the canonical `nodes` dialect.
//!
//! | state type            | node type  |
//! |-----------------------|------------|
//! | `event` with `end`    | `end`      |
//! | `event`               | `start`    |
//! | `operation`           | `function` |
//! | `inject`              | `log`      |
//! | anything else         | `noop`     |
//!
//! Only the first action of an `operation` state is used. Transitions are
//! copied into `next` without checking that they name an existing state.

use crate::value::{display_string, is_truthy};
use serde_json::{Map, Value};

/// Rewrites a `states` document into canonical form.
///
/// Documents that already carry `nodes`, and documents with neither
/// `nodes` nor `states`, are returned unchanged. Every other top-level key
/// is preserved, and `start` defaults to the first node.
///
/// ```
/// use nagare::normalize::normalize;
/// use serde_json::json;
///
/// let canonical = normalize(json!({
///     "states": [
///         {"name": "hello", "type": "inject", "data": {"message": "hi"}, "transition": "bye"},
///         {"name": "bye", "type": "event", "end": true}
///     ]
/// }));
///
/// assert_eq!(canonical["start"], "hello");
/// assert_eq!(canonical["nodes"][0], json!({"id": "hello", "type": "log", "message": "hi", "next": "bye"}));
/// assert_eq!(canonical["nodes"][1], json!({"id": "bye", "type": "end"}));
/// ```
pub fn normalize(document: Value) -> Value {
    let Value::Object(mut top) = document else {
        return document;
    };
    if top.contains_key("nodes") {
        return Value::Object(top);
    }
    let Some(Value::Array(states)) = top.get("states") else {
        return Value::Object(top);
    };

    let nodes: Vec<Value> = states.iter().map(state_to_node).collect();

    if !top.contains_key("start") {
        if let Some(first) = nodes.first().and_then(|node| node.get("id")) {
            top.insert("start".to_string(), first.clone());
        }
    }
    top.insert("nodes".to_string(), Value::Array(nodes));
    Value::Object(top)
}

fn state_to_node(state: &Value) -> Value {
    let mut node = Map::new();
    node.insert(
        "id".to_string(),
        state.get("name").cloned().unwrap_or(Value::Null),
    );

    match state.get("type").and_then(Value::as_str) {
        Some("event") => {
            let kind = if is_truthy(state.get("end")) {
                "end"
            } else {
                "start"
            };
            node.insert("type".to_string(), kind.into());
        }
        Some("operation") => {
            let (func, params) = first_function_ref(state);
            node.insert("type".to_string(), "function".into());
            node.insert("func".to_string(), func);
            node.insert("params".to_string(), params);
        }
        Some("inject") => {
            let message = match state.get("data") {
                None => Value::Null,
                Some(Value::Object(data)) => data.get("message").cloned().unwrap_or(Value::Null),
                Some(other) => Value::String(display_string(other)),
            };
            node.insert("type".to_string(), "log".into());
            node.insert("message".to_string(), message);
        }
        _ => {
            node.insert("type".to_string(), "noop".into());
        }
    }

    if let Some(transition) = state.get("transition") {
        node.insert("next".to_string(), transition_target(transition));
    }

    Value::Object(node)
}

/// Function name and arguments of the first action, `(null, {})` when the
/// state has no usable `functionRef`.
fn first_function_ref(state: &Value) -> (Value, Value) {
    let empty = || Value::Object(Map::new());
    let function_ref = state
        .get("actions")
        .and_then(Value::as_array)
        .and_then(|actions| actions.first())
        .and_then(|action| action.get("functionRef"));

    match function_ref {
        Some(Value::String(name)) => (Value::String(name.clone()), empty()),
        Some(Value::Object(function_ref)) => (
            function_ref.get("refName").cloned().unwrap_or(Value::Null),
            function_ref.get("arguments").cloned().unwrap_or_else(empty),
        ),
        _ => (Value::Null, empty()),
    }
}

fn transition_target(transition: &Value) -> Value {
    match transition.get("nextState") {
        Some(next_state) if transition.is_object() => next_state.clone(),
        _ => transition.clone(),
    }
}
