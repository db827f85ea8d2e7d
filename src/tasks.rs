//! Task functions available to workflows run from the command line.

use nagare::{Arguments, BoxError, FunctionRegistry};
use serde_json::{json, Value};

/// Returns a greeting as `{"result": "Hello, <name>!"}`.
pub fn greet(args: Arguments) -> Result<Value, BoxError> {
    match args.bind_str("name") {
        Some(name) if !name.is_empty() => Ok(json!({"result": format!("Hello, {}!", name)})),
        _ => Err("name is required".into()),
    }
}

/// Upper-cases `message` into `{"result": ...}`.
pub fn uppercase(args: Arguments) -> Result<Value, BoxError> {
    match args.bind("message") {
        None | Some(Value::Null) => Err("message is required".into()),
        Some(Value::String(message)) => Ok(json!({"result": message.to_uppercase()})),
        Some(other) => Err(format!("message must be a string, got {}", other).into()),
    }
}

pub fn registry() -> FunctionRegistry {
    FunctionRegistry::new()
        .with("greet", greet)
        .with("uppercase", uppercase)
}
