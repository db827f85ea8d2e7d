//! Named task functions and their registry.
//!
//! `function` nodes refer to callables by name. The embedding application
//! registers them up front; the engine only looks them up and calls them.

use crate::error::{BoxError, WorkflowError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Arguments handed to a [`TaskFunction`].
///
/// A resolved mapping becomes [`Arguments::Named`], one entry per
/// parameter. Any other value is passed as a single positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Named(Map<String, Value>),
    Positional(Value),
}

impl Arguments {
    /// Looks up the parameter called `name`.
    ///
    /// A positional argument always binds to the first parameter, so it is
    /// returned whatever `name` is asked for.
    ///
    /// ```
    /// use nagare::Arguments;
    /// use serde_json::json;
    ///
    /// let named = Arguments::from(json!({"name": "Ada"}));
    /// assert_eq!(named.bind("name"), Some(&json!("Ada")));
    /// assert_eq!(named.bind("age"), None);
    ///
    /// let positional = Arguments::from(json!("Ada"));
    /// assert_eq!(positional.bind("name"), Some(&json!("Ada")));
    /// ```
    pub fn bind(&self, name: &str) -> Option<&Value> {
        match self {
            Arguments::Named(map) => map.get(name),
            Arguments::Positional(value) => Some(value),
        }
    }

    /// Like [`Arguments::bind`], for string parameters.
    pub fn bind_str(&self, name: &str) -> Option<&str> {
        self.bind(name).and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        match self {
            Arguments::Named(map) => Value::Object(map),
            Arguments::Positional(value) => value,
        }
    }
}

impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Arguments::Named(map),
            other => Arguments::Positional(other),
        }
    }
}

/// A callable that `function` nodes can invoke.
///
/// Plain functions and closures of the shape
/// `Fn(Arguments) -> Result<Value, BoxError>` implement this trait, so most
/// registrations need no extra type:
///
/// ```
/// use nagare::{Arguments, BoxError, FunctionRegistry};
/// use serde_json::{json, Value};
///
/// fn shout(args: Arguments) -> Result<Value, BoxError> {
///     let text = args.bind_str("text").ok_or("text is required")?;
///     Ok(json!(text.to_uppercase()))
/// }
///
/// let registry = FunctionRegistry::new()
///     .with("shout", shout)
///     .with("echo", |args: Arguments| -> Result<Value, BoxError> {
///         Ok(args.into_value())
///     });
/// assert!(registry.contains("shout"));
/// assert!(registry.contains("echo"));
/// ```
#[async_trait]
pub trait TaskFunction: Send + Sync {
    async fn call(&self, args: Arguments) -> Result<Value, BoxError>;
}

#[async_trait]
impl<F> TaskFunction for F
where
    F: Fn(Arguments) -> Result<Value, BoxError> + Send + Sync,
{
    async fn call(&self, args: Arguments) -> Result<Value, BoxError> {
        self(args)
    }
}

/// Name-indexed table of [`TaskFunction`]s.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn TaskFunction>>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function` under `name`, replacing any previous entry.
    pub fn register<F: TaskFunction + 'static>(&mut self, name: &str, function: F) {
        self.functions.insert(name.to_string(), Arc::new(function));
    }

    /// Builder-style [`FunctionRegistry::register`].
    pub fn with<F: TaskFunction + 'static>(mut self, name: &str, function: F) -> Self {
        self.register(name, function);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TaskFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Calls the function registered as `name` with `args`.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::UnknownFunction`] if nothing is registered as `name`
    /// - [`WorkflowError::FunctionExecution`] wrapping whatever the function
    ///   returned as its error
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value, WorkflowError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| WorkflowError::UnknownFunction(name.to_string()))?;

        function
            .call(Arguments::from(args))
            .await
            .map_err(|source| WorkflowError::FunctionExecution {
                function: name.to_string(),
                source,
            })
    }
}
