use crate::workflow::NodeId;
use thiserror::Error;

/// Boxed error returned by task functions and HTTP clients.
///
/// Collaborator failures are carried through untouched as the `source` of
/// the [`WorkflowError`] that wraps them.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building or running a workflow.
///
/// Every variant aborts the run it occurs in. Nothing is retried and no
/// partial result is reported; the caller decides how to present the error.
///
/// # Non-Exhaustive
///
/// This enum is marked `#[non_exhaustive]`, so matches need a wildcard arm:
///
/// ```
/// use nagare::WorkflowError;
///
/// fn describe(error: &WorkflowError) -> String {
///     match error {
///         WorkflowError::PathNotFound { path } => format!("missing value at {}", path),
///         WorkflowError::NodeNotFound(id) => format!("dangling reference to {}", id),
///         WorkflowError::PossibleInfiniteLoop { limit } => {
///             format!("gave up after {} steps", limit)
///         }
///         other => other.to_string(),
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WorkflowError {
    /// A `${...}` placeholder references a path absent from the context.
    #[error("Path '{path}' not found in context")]
    PathNotFound {
        /// The dotted path as written inside the placeholder
        path: String,
    },

    /// The walk reached a node id that is not part of the workflow.
    ///
    /// This covers both a `start` that names no node and a `next`
    /// pointing nowhere; neither is checked before the run.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A `function` node names a callable missing from the registry.
    #[error("Unknown function: '{0}'")]
    UnknownFunction(String),

    /// A registered callable returned an error.
    #[error("Function '{function}' failed: {source}")]
    FunctionExecution {
        /// Name the function was registered under
        function: String,
        /// The error raised by the function itself
        #[source]
        source: BoxError,
    },

    /// A node carries a type the engine cannot execute.
    #[error("Unsupported node type '{kind}' in node '{node}'")]
    UnsupportedNodeKind {
        /// The offending node
        node: NodeId,
        /// The type tag as written in the document
        kind: String,
    },

    /// The step ceiling was exceeded.
    #[error("Possible infinite loop: exceeded {limit} steps")]
    PossibleInfiniteLoop {
        /// The configured ceiling
        limit: usize,
    },

    /// A non-simulated `http` node failed to complete its request.
    #[error("HTTP {method} {url} failed in node '{node}': {source}")]
    Http {
        /// The `http` node that issued the request
        node: NodeId,
        /// Request method
        method: String,
        /// Resolved request URL
        url: String,
        /// The client error
        #[source]
        source: BoxError,
    },

    /// The document cannot be turned into an executable workflow.
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    /// `run` was called on an engine that has already run.
    ///
    /// An engine owns the context of a single run; create a new engine to
    /// run the workflow again.
    #[error("Engine has already run; create a new engine for another run")]
    AlreadyRun,
}
