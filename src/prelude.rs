//! Commonly used types and traits

pub use crate::context::Context;
pub use crate::engine::{Engine, EngineConfig};
pub use crate::error::{BoxError, WorkflowError};
pub use crate::function::{Arguments, FunctionRegistry, TaskFunction};
pub use crate::workflow::{Node, Workflow};
