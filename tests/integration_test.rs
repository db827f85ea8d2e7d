use async_trait::async_trait;
use nagare::lint::lint_manifest;
use nagare::loader::{load_document, load_documents, parse_documents};
use nagare::prelude::*;
use nagare::{Completion, HttpClient, HttpRequest, NodeKind, INPUT_KEY};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn greet(args: Arguments) -> Result<Value, BoxError> {
    match args.bind_str("name") {
        Some(name) if !name.is_empty() => Ok(json!({"result": format!("Hello, {}!", name)})),
        _ => Err("name is required".into()),
    }
}

fn uppercase(args: Arguments) -> Result<Value, BoxError> {
    let message = args.bind_str("message").ok_or("message is required")?;
    Ok(json!({"result": message.to_uppercase()}))
}

fn functions() -> FunctionRegistry {
    FunctionRegistry::new()
        .with("greet", greet)
        .with("uppercase", uppercase)
}

fn workflow_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("workflows")
        .join(name)
}

fn workflow_from_yaml(text: &str) -> Workflow {
    let document = parse_documents(text).unwrap().remove(0);
    Workflow::load(document).unwrap()
}

#[derive(Default)]
struct RecordingHttp {
    requests: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl HttpClient for RecordingHttp {
    async fn send(&self, request: HttpRequest) -> Result<String, BoxError> {
        self.requests.lock().unwrap().push(request);
        Ok("202 accepted".to_string())
    }
}

#[tokio::test]
async fn test_complete_workflow_from_file() {
    let workflow = Workflow::load(load_document(workflow_file("greeting.sw.yaml")).unwrap()).unwrap();
    assert_eq!(workflow.start(), "begin");
    assert_eq!(workflow.len(), 5);

    let functions = functions();
    let mut engine = Engine::new(&workflow, &functions);
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.steps, 5);
    assert_eq!(summary.completion, Completion::ReachedEnd("done".into()));

    let ctx = engine.context();
    assert_eq!(ctx.get(INPUT_KEY), Some(&json!({"name": "Ada"})));
    assert_eq!(ctx.get("greet"), Some(&json!({"result": "Hello, Ada!"})));
    assert_eq!(ctx.get("shout"), Some(&json!({"result": "HELLO, ADA!"})));
    assert_eq!(ctx.get("announce"), Some(&json!({"result": "Result: HELLO, ADA!"})));
    assert_eq!(
        ctx.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["input", "greet", "shout", "announce"]
    );
}

#[tokio::test]
async fn test_input_override() {
    let workflow = Workflow::load(load_document(workflow_file("greeting.sw.yaml")).unwrap()).unwrap();
    let functions = functions();

    let mut engine = Engine::new(&workflow, &functions).with_input(json!({"name": "Grace"}));
    engine.run().await.unwrap();
    assert_eq!(engine.context().get("shout"), Some(&json!({"result": "HELLO, GRACE!"})));

    // The workflow is untouched by the previous run
    let mut engine = Engine::new(&workflow, &functions);
    engine.run().await.unwrap();
    assert_eq!(engine.context().get("greet"), Some(&json!({"result": "Hello, Ada!"})));
}

#[tokio::test]
async fn test_http_workflow_simulated_and_sent() {
    let workflow = Workflow::load(load_document(workflow_file("notify.yaml")).unwrap()).unwrap();
    match &workflow.node("notify").unwrap().kind {
        NodeKind::Http { simulate, .. } => assert!(*simulate),
        other => panic!("Unexpected kind: {:?}", other),
    }
    let functions = FunctionRegistry::new();

    let mut engine = Engine::new(&workflow, &functions);
    engine.run().await.unwrap();
    assert_eq!(engine.context().get("notify"), Some(&json!({"result": "http_simulated"})));
    assert_eq!(
        engine.context().get("report"),
        Some(&json!({"result": "Webhook answered http_simulated"}))
    );

    let mut document = load_document(workflow_file("notify.yaml")).unwrap();
    document["nodes"][1]["simulate"] = json!(false);
    let workflow = Workflow::load(document).unwrap();
    let client = Arc::new(RecordingHttp::default());

    let mut engine = Engine::new(&workflow, &functions).with_http_client(client.clone());
    engine.run().await.unwrap();
    assert_eq!(engine.context().get("notify"), Some(&json!({"result": "202 accepted"})));
    assert_eq!(
        *client.requests.lock().unwrap(),
        vec![HttpRequest {
            method: "POST".to_string(),
            url: "https://hooks.example.com/orders/ORDER-001".to_string(),
            body: json!({"order": "ORDER-001", "status": "paid"}),
        }]
    );
}

#[tokio::test]
async fn test_offline_config_forces_simulation() {
    let mut document = load_document(workflow_file("notify.yaml")).unwrap();
    document["nodes"][1]["simulate"] = json!(false);
    let workflow = Workflow::load(document).unwrap();
    let functions = FunctionRegistry::new();
    let client = Arc::new(RecordingHttp::default());

    let mut engine = Engine::new(&workflow, &functions)
        .with_http_client(client.clone())
        .with_config(EngineConfig {
            force_simulate_http: true,
            ..EngineConfig::default()
        });
    engine.run().await.unwrap();

    assert_eq!(engine.context().get("notify"), Some(&json!({"result": "http_simulated"})));
    assert!(client.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fenced_nodes_document() {
    let workflow = workflow_from_yaml(
        "```yaml\n\
         start: a\n\
         nodes:\n\
         \x20 - {id: a, type: start, next: b}\n\
         \x20 - {id: b, type: log, message: hi, next: c}\n\
         \x20 - {id: c, type: end}\n\
         ```\n",
    );
    let functions = FunctionRegistry::new();
    let mut engine = Engine::new(&workflow, &functions);
    engine.run().await.unwrap();

    let ctx = engine.into_context();
    assert_eq!(ctx.len(), 2);
    assert_eq!(ctx.get("input"), Some(&json!({})));
    assert_eq!(ctx.get("b"), Some(&json!({"result": "hi"})));
}

#[tokio::test]
async fn test_self_loop_is_aborted() {
    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let functions = FunctionRegistry::new().with("tick", move |_args: Arguments| -> Result<Value, BoxError> {
        *counter.lock().unwrap() += 1;
        Ok(Value::Null)
    });
    let workflow = workflow_from_yaml(
        "states:\n  - name: spin\n    type: operation\n    actions:\n      - functionRef: tick\n    transition: spin\n",
    );

    let mut engine = Engine::new(&workflow, &functions);
    match engine.run().await {
        Err(WorkflowError::PossibleInfiniteLoop { limit }) => assert_eq!(limit, 1000),
        other => panic!("Unexpected result: {:?}", other),
    }
    assert_eq!(*calls.lock().unwrap(), 1000);
}

#[tokio::test]
async fn test_unknown_function_stops_the_run() {
    let workflow = workflow_from_yaml(
        "states:\n\
         \x20 - name: first\n\
         \x20   type: operation\n\
         \x20   actions: [{functionRef: {refName: missing}}]\n\
         \x20   transition: after\n\
         \x20 - name: after\n\
         \x20   type: inject\n\
         \x20   data: {message: unreachable}\n",
    );
    let functions = functions();
    let mut engine = Engine::new(&workflow, &functions);

    match engine.run().await {
        Err(WorkflowError::UnknownFunction(name)) => assert_eq!(name, "missing"),
        other => panic!("Unexpected result: {:?}", other),
    }
    assert!(!engine.context().contains_key("first"));
    assert!(!engine.context().contains_key("after"));
}

#[tokio::test]
async fn test_missing_template_path() {
    let workflow = workflow_from_yaml(
        "states:\n\
         \x20 - name: greet\n\
         \x20   type: operation\n\
         \x20   actions: [{functionRef: {refName: greet, arguments: {name: '${input.user.name}'}}}]\n",
    );
    let functions = functions();
    let mut engine = Engine::new(&workflow, &functions);

    match engine.run().await {
        Err(WorkflowError::PathNotFound { path }) => assert_eq!(path, "input.user.name"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_function_error_is_reported() {
    let workflow = workflow_from_yaml(
        "input: {name: ''}\n\
         states:\n\
         \x20 - name: greet\n\
         \x20   type: operation\n\
         \x20   actions: [{functionRef: {refName: greet, arguments: {name: '${input.name}'}}}]\n",
    );
    let functions = functions();
    let mut engine = Engine::new(&workflow, &functions);

    let error = engine.run().await.unwrap_err();
    assert_eq!(error.to_string(), "Function 'greet' failed: name is required");
}

#[test]
fn test_manifest_lint() {
    let documents = load_documents(workflow_file("order-manifest.yaml")).unwrap();
    assert_eq!(documents.len(), 1);
    assert!(lint_manifest(&documents[0]).is_empty());

    let documents = parse_documents(
        "apiVersion: v1\n\
         kind: SonataFlow\n\
         metadata: {name: broken}\n\
         spec:\n\
         \x20 flow:\n\
         \x20   start: a\n\
         \x20   states:\n\
         \x20     - {name: a, type: operation}\n\
         \x20     - {name: a, type: inject}\n\
         ---\n\
         kind: Other\n",
    )
    .unwrap();
    assert_eq!(
        lint_manifest(&documents[0]),
        vec![
            "spec.flow.states[0]: operation without 'actions'",
            "spec.flow.states[1]: duplicate name \"a\"",
            "spec.flow.states[1]: inject without 'data'",
        ]
    );
    assert_eq!(
        lint_manifest(&documents[1]),
        vec!["missing apiVersion", "missing metadata", "missing spec"]
    );
}

#[tokio::test]
async fn test_manifest_flow_runs_after_unwrapping() {
    let manifest = load_document(workflow_file("order-manifest.yaml")).unwrap();
    let mut flow = manifest["spec"]["flow"].clone();
    flow["input"] = json!({"customer": "Ada"});

    let workflow = Workflow::load(flow).unwrap();
    assert_eq!(workflow.start(), "received");

    let functions = functions();
    let mut engine = Engine::new(&workflow, &functions);
    let summary = engine.run().await.unwrap();

    // `confirm` is an inject state marked `end`, so the run stops there
    assert_eq!(summary.completion, Completion::NoSuccessor("confirm".into()));
    assert_eq!(engine.context().get("confirm"), Some(&json!({"result": "Hello, Ada!"})));
}
