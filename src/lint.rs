//! Structural checks for Kubernetes-style workflow manifests.
//!
//! A manifest wraps a `states` flow under `spec.flow`:
//!
//! ```yaml
//! apiVersion: sonataflow.org/v1alpha08
//! kind: SonataFlow
//! metadata:
//!   name: order
//! spec:
//!   flow:
//!     start: receive
//!     states:
//!       - name: receive
//!         type: event
//!         end: true
//! ```
//!
//! The linter never executes anything. It only reports what is missing.

use crate::value::is_truthy;
use serde_json::Value;

/// Lists every problem found in `document`. An empty list means it is fine.
///
/// ```
/// use nagare::lint::lint_manifest;
/// use serde_json::json;
///
/// let problems = lint_manifest(&json!({
///     "apiVersion": "v1",
///     "kind": "SonataFlow",
///     "metadata": {"name": "demo"},
///     "spec": {"flow": {"start": "a", "states": [{"name": "a", "type": "operation"}]}}
/// }));
/// assert_eq!(problems, vec!["spec.flow.states[0]: operation without 'actions'"]);
/// ```
pub fn lint_manifest(document: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    let Some(top) = document.as_object() else {
        problems.push("document is not a mapping".to_string());
        return problems;
    };

    if !top.contains_key("apiVersion") {
        problems.push("missing apiVersion".to_string());
    }
    if !top.contains_key("kind") {
        problems.push("missing kind".to_string());
    }
    match top.get("metadata").and_then(Value::as_object) {
        Some(metadata) if !metadata.contains_key("name") => {
            problems.push("missing metadata.name".to_string());
        }
        Some(_) => {}
        None => problems.push("missing metadata".to_string()),
    }

    let spec = top.get("spec");
    if !is_truthy(spec) {
        problems.push("missing spec".to_string());
        return problems;
    }
    let flow = spec.and_then(|spec| spec.get("flow"));
    if !is_truthy(flow) {
        problems.push("missing spec.flow".to_string());
        return problems;
    }
    let Some(flow) = flow.and_then(Value::as_object) else {
        problems.push("spec.flow is not a mapping".to_string());
        return problems;
    };

    if !flow.contains_key("start") {
        problems.push("missing spec.flow.start".to_string());
    }
    match flow.get("states") {
        None => problems.push("missing spec.flow.states".to_string()),
        Some(Value::Array(states)) => lint_states(states, &mut problems),
        Some(_) => problems.push("spec.flow.states must be a list".to_string()),
    }

    problems
}

fn lint_states(states: &[Value], problems: &mut Vec<String>) {
    let mut names: Vec<&Value> = Vec::new();

    for (index, state) in states.iter().enumerate() {
        let prefix = format!("spec.flow.states[{}]", index);
        let Some(state) = state.as_object() else {
            problems.push(format!("{}: not a mapping", prefix));
            continue;
        };

        match state.get("name") {
            None => problems.push(format!("{}: missing name", prefix)),
            Some(name) if names.contains(&name) => {
                problems.push(format!("{}: duplicate name {}", prefix, name));
            }
            Some(name) => names.push(name),
        }

        let Some(kind) = state.get("type") else {
            problems.push(format!("{}: missing type", prefix));
            continue;
        };
        match kind.as_str() {
            Some("inject") if !state.contains_key("data") && !state.contains_key("end") => {
                problems.push(format!("{}: inject without 'data'", prefix));
            }
            Some("operation") => match state.get("actions") {
                None => problems.push(format!("{}: operation without 'actions'", prefix)),
                Some(Value::Array(actions)) if !actions.is_empty() => {}
                Some(_) => problems.push(format!("{}: actions empty or not a list", prefix)),
            },
            _ => {}
        }
    }
}
