use crate::context::{Context, INPUT_KEY};
use crate::error::{BoxError, WorkflowError};
use crate::function::FunctionRegistry;
use crate::http::{HttpClient, HttpRequest, ReqwestClient};
use crate::template::resolve;
use crate::value::display_string;
use crate::workflow::{Node, NodeId, NodeKind, Workflow};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Step ceiling used by [`EngineConfig::default`].
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Result recorded for a simulated `http` node.
pub const SIMULATED_HTTP_RESULT: &str = "http_simulated";

/// Engine settings.
///
/// # Examples
///
/// ```
/// use nagare::EngineConfig;
///
/// let config = EngineConfig {
///     max_steps: 50,
///     ..EngineConfig::default()
/// };
/// assert!(!config.force_simulate_http);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of nodes a run may execute before it is aborted.
    /// Default: 1000.
    pub max_steps: usize,
    /// Simulate every `http` node regardless of its `simulate` flag.
    /// Default: false.
    pub force_simulate_http: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            force_simulate_http: false,
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// An `end` node was reached.
    ReachedEnd(NodeId),
    /// The last node executed had no `next`.
    NoSuccessor(NodeId),
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of nodes executed, the terminal one included
    pub steps: usize,
    pub completion: Completion,
    pub elapsed: Duration,
}

/// Walks a [`Workflow`] node by node.
///
/// An engine owns the [`Context`] of exactly one run. The workflow and the
/// function registry are only borrowed, so both can be reused for as many
/// engines as needed.
///
/// # Examples
///
/// ```
/// use nagare::{Engine, FunctionRegistry, Node, Workflow};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), nagare::WorkflowError> {
/// let workflow = Workflow::builder()
///     .add_node(Node::start("begin").then("hello"))
///     .add_node(Node::log("hello", "Hello ${input.name}").then("done"))
///     .add_node(Node::end("done"))
///     .build()?;
/// let functions = FunctionRegistry::new();
///
/// let mut engine = Engine::new(&workflow, &functions).with_input(json!({"name": "Ada"}));
/// engine.run().await?;
///
/// assert_eq!(engine.context().get("hello"), Some(&json!({"result": "Hello Ada"})));
/// # Ok(())
/// # }
/// ```
pub struct Engine<'w> {
    workflow: &'w Workflow,
    functions: &'w FunctionRegistry,
    http: Option<Arc<dyn HttpClient>>,
    config: EngineConfig,
    context: Context,
    steps: usize,
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("workflow", self.workflow)
            .field("config", &self.config)
            .field("context", &self.context.keys().collect::<Vec<_>>())
            .field("steps", &self.steps)
            .finish()
    }
}

impl<'w> Engine<'w> {
    /// Creates an engine whose context is seeded with the workflow's
    /// declared input.
    pub fn new(workflow: &'w Workflow, functions: &'w FunctionRegistry) -> Self {
        Self {
            workflow,
            functions,
            http: None,
            config: EngineConfig::default(),
            context: Context::new(workflow.input().clone()),
            steps: 0,
        }
    }

    /// Replaces the declared input.
    pub fn with_input(mut self, input: Value) -> Self {
        self.context.insert(INPUT_KEY, input);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `client` for non-simulated `http` nodes instead of a default
    /// [`ReqwestClient`].
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http = Some(client);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn into_context(self) -> Context {
        self.context
    }

    /// Number of nodes executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Runs the workflow from its start node until it ends or fails.
    ///
    /// Each node's result is stored in the context before the next node is
    /// entered. The first error aborts the run and is returned as is; the
    /// failing node leaves no entry behind.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::NodeNotFound`] when `start` or a `next` names no node
    /// - [`WorkflowError::PossibleInfiniteLoop`] once more than
    ///   [`EngineConfig::max_steps`] nodes would run
    /// - [`WorkflowError::UnsupportedNodeKind`] for nodes of unknown type
    /// - [`WorkflowError::AlreadyRun`] when this engine has run before,
    ///   successfully or not
    /// - any error raised while resolving templates, dispatching functions
    ///   or sending requests
    pub async fn run(&mut self) -> Result<RunSummary, WorkflowError> {
        // Every run executes at least one step, even a failing one
        if self.steps > 0 {
            return Err(WorkflowError::AlreadyRun);
        }

        let mut current = Some(self.workflow.start().clone());
        let mut last = self.workflow.start().clone();

        while let Some(node_id) = current {
            self.steps += 1;
            if self.steps > self.config.max_steps {
                warn!(
                    "Aborting after {} steps, node '{}' was next",
                    self.config.max_steps, node_id
                );
                return Err(WorkflowError::PossibleInfiniteLoop {
                    limit: self.config.max_steps,
                });
            }

            let workflow = self.workflow;
            let node = workflow
                .node(node_id.as_str())
                .ok_or_else(|| WorkflowError::NodeNotFound(node_id.clone()))?;
            info!("Running node '{}' (type={})", node.id, node.kind.name());

            if let NodeKind::End = node.kind {
                info!(
                    "Workflow finished at '{}' after {} steps in {:?}",
                    node.id,
                    self.steps,
                    self.context.elapsed()
                );
                return Ok(self.summary(Completion::ReachedEnd(node.id.clone())));
            }

            if let Err(e) = self.execute(node).await {
                warn!("Node '{}' failed: {}", node.id, e);
                return Err(e);
            }
            current = node.next.clone();
            last = node_id;
        }

        info!(
            "Workflow stopped at '{}' with no next node after {} steps",
            last, self.steps
        );
        Ok(self.summary(Completion::NoSuccessor(last)))
    }

    fn summary(&self, completion: Completion) -> RunSummary {
        RunSummary {
            steps: self.steps,
            completion,
            elapsed: self.context.elapsed(),
        }
    }

    async fn execute(&mut self, node: &Node) -> Result<(), WorkflowError> {
        match &node.kind {
            NodeKind::Start | NodeKind::Noop | NodeKind::End => Ok(()),
            NodeKind::Function { func, params } => {
                let args = resolve(params, &self.context)?;
                let name = func.as_deref().unwrap_or_default();
                debug!("Calling '{}' with {}", name, args);
                let result = self.functions.dispatch(name, args).await?;
                info!(" -> result: {}", result);
                self.context.insert(node.id.as_str(), result);
                Ok(())
            }
            NodeKind::Http {
                method,
                url,
                params,
                simulate,
            } => {
                let body = resolve(params, &self.context)?;
                let url = display_string(&resolve(&Value::String(url.clone()), &self.context)?);
                let method = method.to_uppercase();

                let result = if *simulate || self.config.force_simulate_http {
                    info!("Simulating HTTP {} {} with body {}", method, url, body);
                    json!({ "result": SIMULATED_HTTP_RESULT })
                } else {
                    let text = self.send(node, method, url, body).await?;
                    json!({ "result": text })
                };
                self.context.insert(node.id.as_str(), result);
                Ok(())
            }
            NodeKind::Log { message } => {
                let message = resolve(message, &self.context)?;
                info!("{}", display_string(&message));
                self.context
                    .insert(node.id.as_str(), json!({ "result": message }));
                Ok(())
            }
            NodeKind::Unsupported(kind) => Err(WorkflowError::UnsupportedNodeKind {
                node: node.id.clone(),
                kind: kind.clone(),
            }),
        }
    }

    async fn send(
        &mut self,
        node: &Node,
        method: String,
        url: String,
        body: Value,
    ) -> Result<String, WorkflowError> {
        let http_error = |method: &str, url: &str, source: BoxError| WorkflowError::Http {
            node: node.id.clone(),
            method: method.to_string(),
            url: url.to_string(),
            source,
        };

        let client = match &self.http {
            Some(client) => Arc::clone(client),
            None => {
                let client: Arc<dyn HttpClient> = Arc::new(
                    ReqwestClient::new().map_err(|e| http_error(&method, &url, e.into()))?,
                );
                self.http = Some(Arc::clone(&client));
                client
            }
        };

        let request = HttpRequest {
            method: method.clone(),
            url: url.clone(),
            body,
        };
        client
            .send(request)
            .await
            .map_err(|source| http_error(&method, &url, source))
    }
}
