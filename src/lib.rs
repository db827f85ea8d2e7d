//! # Nagare (流れ)
//!
//! A small interpreter for declarative workflows.
//!
//! The name "Nagare" (流れ) means "flow" in Japanese. A workflow document
//! describes a graph of nodes; the engine walks it from the start node,
//! one node at a time, storing each node's result in a shared context that
//! later nodes can read through `${...}` placeholders.
//!
//! ## Features
//!
//! - **Two dialects**: the canonical `nodes` form, and a `states` form that
//!   is normalized into it (see [`normalize`])
//! - **Templates**: `${input.name}` style placeholders resolved against the
//!   context, recursively through nested parameters (see [`template`])
//! - **Registered functions**: an explicit name → callable table, no
//!   reflection (see [`FunctionRegistry`])
//! - **HTTP nodes**: simulated by default, or sent through a pluggable
//!   [`HttpClient`]
//! - **Loop guard**: a run is aborted after 1000 steps by default
//! - **Error Handling**: Structured errors with `thiserror`
//!
//! ## Quick Start
//!
//! ```rust
//! use nagare::prelude::*;
//! use serde_json::{json, Value};
//!
//! fn greet(args: Arguments) -> Result<Value, BoxError> {
//!     let name = args.bind_str("name").ok_or("name is required")?;
//!     Ok(json!({"result": format!("Hello, {}!", name)}))
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let workflow = Workflow::load(json!({
//!     "input": {"name": "Ada"},
//!     "states": [
//!         {"name": "begin", "type": "event", "transition": "greet"},
//!         {
//!             "name": "greet",
//!             "type": "operation",
//!             "actions": [{"functionRef": {"refName": "greet", "arguments": {"name": "${input.name}"}}}],
//!             "transition": "announce"
//!         },
//!         {"name": "announce", "type": "inject", "data": {"message": "${greet.result}"}, "transition": "done"},
//!         {"name": "done", "type": "event", "end": true}
//!     ]
//! }))
//! .expect("valid workflow");
//!
//! let functions = FunctionRegistry::new().with("greet", greet);
//! let mut engine = Engine::new(&workflow, &functions);
//! engine.run().await.expect("workflow failed");
//!
//! assert_eq!(
//!     engine.context().get("announce"),
//!     Some(&json!({"result": "Hello, Ada!"}))
//! );
//! # }
//! ```
//!
//! ## Error Handling
//!
//! A run stops at the first failing node:
//!
//! ```rust
//! use nagare::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let workflow = Workflow::builder()
//!     .add_node(Node::function("charge", "charge_card", json!({})).then("done"))
//!     .add_node(Node::end("done"))
//!     .build()
//!     .unwrap();
//! let functions = FunctionRegistry::new();
//!
//! let mut engine = Engine::new(&workflow, &functions);
//! match engine.run().await {
//!     Err(WorkflowError::UnknownFunction(name)) => {
//!         eprintln!("No function registered as {}", name);
//!     }
//!     Err(error) => eprintln!("Error: {}", error),
//!     Ok(summary) => println!("Finished in {} steps", summary.steps),
//! }
//! assert!(!engine.context().contains_key("charge"));
//! # }
//! ```

mod context;
mod engine;
mod error;
mod function;
mod http;
mod workflow;

pub mod lint;
pub mod loader;
pub mod normalize;
pub mod prelude;
pub mod template;
pub mod value;

pub use context::{Context, INPUT_KEY};
pub use engine::{
    Completion, Engine, EngineConfig, RunSummary, DEFAULT_MAX_STEPS, SIMULATED_HTTP_RESULT,
};
pub use error::{BoxError, WorkflowError};
pub use function::{Arguments, FunctionRegistry, TaskFunction};
pub use http::{HttpClient, HttpRequest, ReqwestClient};
pub use loader::LoadError;
pub use workflow::{Node, NodeId, NodeKind, Workflow, WorkflowBuilder};
