use crate::error::WorkflowError;
use crate::normalize::normalize;
use crate::value::display_string;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Identifier of a node within a workflow.
///
/// # Examples
///
/// ```
/// use nagare::NodeId;
///
/// let id = NodeId::new("greet");
/// assert_eq!(id.as_str(), "greet");
///
/// let id: NodeId = "done".into();
/// assert_eq!(id.to_string(), "done");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// What a node does when the engine reaches it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Entry marker; moves straight on to `next`.
    Start,
    /// Ends the run successfully.
    End,
    /// Calls a registered function with resolved `params`.
    Function {
        /// Registered function name. `None` when the document gave none.
        func: Option<String>,
        /// Argument template, resolved before the call
        params: Value,
    },
    /// Issues (or simulates) an outbound HTTP request.
    Http {
        method: String,
        /// URL template
        url: String,
        /// Body template
        params: Value,
        /// When set, no request leaves the process
        simulate: bool,
    },
    /// Emits a resolved message.
    Log {
        /// Message template; usually a string but any value is accepted
        message: Value,
    },
    /// Does nothing; moves on to `next`.
    Noop,
    /// A type tag the engine does not know. Fails when executed.
    Unsupported(String),
}

impl NodeKind {
    /// The document type tag for this kind.
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Function { .. } => "function",
            NodeKind::Http { .. } => "http",
            NodeKind::Log { .. } => "log",
            NodeKind::Noop => "noop",
            NodeKind::Unsupported(kind) => kind,
        }
    }
}

/// A node of the canonical graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub next: Option<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            next: None,
            kind,
        }
    }

    pub fn start(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Start)
    }

    pub fn end(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::End)
    }

    pub fn noop(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Noop)
    }

    pub fn function(id: impl Into<NodeId>, func: &str, params: Value) -> Self {
        Self::new(
            id,
            NodeKind::Function {
                func: Some(func.to_string()),
                params,
            },
        )
    }

    /// A simulated HTTP node.
    pub fn http(id: impl Into<NodeId>, method: &str, url: &str, params: Value) -> Self {
        Self::new(
            id,
            NodeKind::Http {
                method: method.to_string(),
                url: url.to_string(),
                params,
                simulate: true,
            },
        )
    }

    pub fn log(id: impl Into<NodeId>, message: impl Into<Value>) -> Self {
        Self::new(
            id,
            NodeKind::Log {
                message: message.into(),
            },
        )
    }

    /// Sets the successor node.
    pub fn then(mut self, next: impl Into<NodeId>) -> Self {
        self.next = Some(next.into());
        self
    }
}

/// Node as written in a canonical document.
#[derive(Debug, Deserialize)]
struct NodeSpec {
    id: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    next: Option<Value>,
    func: Option<String>,
    params: Option<Value>,
    method: Option<String>,
    url: Option<String>,
    simulate: Option<bool>,
    #[serde(default = "empty_message")]
    message: Value,
}

fn empty_message() -> Value {
    Value::String(String::new())
}

/// Ids and `next` may be written as any scalar; `1` names node `"1"`.
fn scalar_id(value: Option<Value>, field: &str) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(display_string(&scalar))),
        Some(other) => Err(format!("'{}' must be a scalar, found {}", field, other)),
    }
}

impl NodeSpec {
    fn into_node(self, fallback_id: Option<&str>) -> Result<Node, String> {
        let id = scalar_id(self.id, "id")?
            .or_else(|| fallback_id.map(str::to_string))
            .ok_or_else(|| "node without an 'id'".to_string())?;
        let next = scalar_id(self.next, "next")?.filter(|next| !next.is_empty());
        let params = self
            .params
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let kind = match self.kind.as_deref() {
            Some("start") => NodeKind::Start,
            Some("end") => NodeKind::End,
            Some("noop") => NodeKind::Noop,
            Some("function") => NodeKind::Function {
                func: self.func,
                params,
            },
            Some("http") => NodeKind::Http {
                method: self.method.unwrap_or_else(|| "GET".to_string()),
                url: self.url.unwrap_or_default(),
                params,
                simulate: self.simulate.unwrap_or(true),
            },
            Some("log") => NodeKind::Log {
                message: self.message,
            },
            Some(other) => NodeKind::Unsupported(other.to_string()),
            None => NodeKind::Unsupported("none".to_string()),
        };

        Ok(Node {
            id: NodeId::new(id),
            next: next.map(NodeId::new),
            kind,
        })
    }
}

fn parse_node(raw: &Value, fallback_id: Option<&str>) -> Result<Node, WorkflowError> {
    let label = fallback_id.map_or_else(
        || raw.get("id").map(display_string).unwrap_or_default(),
        str::to_string,
    );
    serde_json::from_value::<NodeSpec>(raw.clone())
        .map_err(|e| e.to_string())
        .and_then(|spec| spec.into_node(fallback_id))
        .map_err(|details| {
            WorkflowError::InvalidWorkflow(format!("malformed node '{}': {}", label, details))
        })
}

/// An executable workflow in canonical form.
///
/// Built from a document with [`Workflow::from_document`] (canonical
/// dialect) or [`Workflow::load`] (either dialect), or in code with
/// [`Workflow::builder`]. A `Workflow` is immutable and can be run any
/// number of times.
///
/// Neither `start` nor any `next` is checked against the node set here;
/// a dangling reference fails the run when it is followed.
#[derive(Clone, PartialEq)]
pub struct Workflow {
    start: NodeId,
    nodes: IndexMap<NodeId, Node>,
    input: Value,
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("start", &self.start)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Workflow {
    pub fn new(start: NodeId, nodes: IndexMap<NodeId, Node>, input: Value) -> Self {
        Self {
            start,
            nodes,
            input,
        }
    }

    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    /// Normalizes `document` and builds the workflow from the result.
    ///
    /// ```
    /// use nagare::Workflow;
    /// use serde_json::json;
    ///
    /// let workflow = Workflow::load(json!({
    ///     "states": [
    ///         {"name": "begin", "type": "event", "transition": "finish"},
    ///         {"name": "finish", "type": "event", "end": true}
    ///     ]
    /// }))?;
    /// assert_eq!(workflow.start(), "begin");
    /// assert_eq!(workflow.len(), 2);
    /// # Ok::<(), nagare::WorkflowError>(())
    /// ```
    pub fn load(document: Value) -> Result<Self, WorkflowError> {
        Self::from_document(&normalize(document))
    }

    /// Builds a workflow from a canonical (`nodes`) document.
    ///
    /// `nodes` may be a sequence of node mappings carrying `id`, or a
    /// mapping from id to node. When two nodes share an id the later one
    /// wins. Unlike [`Workflow::load`] on a `states` document, nothing
    /// picks a default `start` here.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::InvalidWorkflow`] when `nodes` is absent or of the
    /// wrong shape, when `start` is absent, null or empty, or when a node
    /// is malformed.
    pub fn from_document(document: &Value) -> Result<Self, WorkflowError> {
        let raw_nodes = document.get("nodes").ok_or_else(|| {
            WorkflowError::InvalidWorkflow("document has no 'nodes' or 'states'".to_string())
        })?;

        let parsed = match raw_nodes {
            Value::Array(items) => items
                .iter()
                .map(|item| parse_node(item, None))
                .collect::<Result<Vec<_>, _>>()?,
            Value::Object(map) => map
                .iter()
                .map(|(id, item)| parse_node(item, Some(id)))
                .collect::<Result<Vec<_>, _>>()?,
            _ => {
                return Err(WorkflowError::InvalidWorkflow(
                    "'nodes' must be a list or a mapping".to_string(),
                ))
            }
        };

        let mut nodes = IndexMap::with_capacity(parsed.len());
        for node in parsed {
            if nodes.contains_key(&node.id) {
                warn!("Duplicate node id '{}', keeping the last definition", node.id);
            }
            nodes.insert(node.id.clone(), node);
        }

        let start = scalar_id(document.get("start").cloned(), "start")
            .map_err(WorkflowError::InvalidWorkflow)?
            .filter(|start| !start.is_empty())
            .map(NodeId::new)
            .ok_or_else(|| {
                WorkflowError::InvalidWorkflow("workflow has no 'start'".to_string())
            })?;

        let input = document
            .get("input")
            .filter(|input| !input.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        Ok(Self::new(start, nodes, input))
    }

    pub fn start(&self) -> &NodeId {
        &self.start
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The input declared by the document (an empty mapping by default).
    pub fn input(&self) -> &Value {
        &self.input
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Assembles a [`Workflow`] in code.
///
/// ```
/// use nagare::{Node, Workflow};
///
/// let workflow = Workflow::builder()
///     .add_node(Node::start("begin").then("hello"))
///     .add_node(Node::log("hello", "hi").then("done"))
///     .add_node(Node::end("done"))
///     .build()?;
/// assert_eq!(workflow.start(), "begin");
/// # Ok::<(), nagare::WorkflowError>(())
/// ```
#[derive(Debug)]
pub struct WorkflowBuilder {
    nodes: IndexMap<NodeId, Node>,
    start: Option<NodeId>,
    input: Value,
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            start: None,
            input: Value::Object(serde_json::Map::new()),
        }
    }

    /// Adds a node, replacing any earlier node with the same id.
    pub fn add_node(mut self, node: Node) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    /// Start with the given node instead of the first one added.
    pub fn start_with(mut self, id: impl Into<NodeId>) -> Self {
        self.start = Some(id.into());
        self
    }

    /// Sets the declared input.
    pub fn input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn build(self) -> Result<Workflow, WorkflowError> {
        let start = match self.start {
            Some(start) => start,
            None => self.nodes.keys().next().cloned().ok_or_else(|| {
                WorkflowError::InvalidWorkflow("Start node must be specified".to_string())
            })?,
        };

        Ok(Workflow::new(start, self.nodes, self.input))
    }
}
