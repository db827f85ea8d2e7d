use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn workflow_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("workflows")
        .join(name)
}

fn nagare(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nagare"))
        .args(args)
        .env_remove("NAGARE_MAX_STEPS")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_run_succeeds_and_prints_context() {
    let file = workflow_file("greeting.sw.yaml");
    let output = nagare(&["run", path_str(&file)]);

    assert_eq!(output.status.code(), Some(0));
    let context: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(context["shout"]["result"], "HELLO, ADA!");
    assert_eq!(context["announce"]["result"], "Result: HELLO, ADA!");
}

#[test]
fn test_run_with_input_override() {
    let file = workflow_file("greeting.sw.yaml");
    let output = nagare(&["run", path_str(&file), "--input", r#"{"name": "Grace"}"#]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("HELLO, GRACE!"));
}

#[test]
fn test_run_offline_http() {
    let file = workflow_file("notify.yaml");
    let output = nagare(&["run", path_str(&file), "--offline"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("http_simulated"));
}

#[test]
fn test_run_invalid_input_is_a_usage_error() {
    let file = workflow_file("greeting.sw.yaml");
    let output = nagare(&["run", path_str(&file), "--input", "{not json"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_run_without_subcommand_is_a_usage_error() {
    assert_eq!(nagare(&[]).status.code(), Some(2));
    assert_eq!(nagare(&["run"]).status.code(), Some(2));
}

#[test]
fn test_run_failures_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.yaml");
    assert_eq!(nagare(&["run", path_str(&missing)]).status.code(), Some(1));

    let unknown = dir.path().join("unknown.yaml");
    fs::write(
        &unknown,
        "states:\n  - name: call\n    type: operation\n    actions:\n      - functionRef: nowhere\n",
    )
    .unwrap();
    let output = nagare(&["run", path_str(&unknown)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown function: 'nowhere'"));

    let file = workflow_file("greeting.sw.yaml");
    let output = nagare(&["run", path_str(&file), "--max-steps", "2"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_lint_valid_manifest() {
    let file = workflow_file("order-manifest.yaml");
    let output = nagare(&["lint", path_str(&file)]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("no problems found"));
}

#[test]
fn test_lint_problems_exit_with_one() {
    let file = workflow_file("greeting.sw.yaml");
    let output = nagare(&["lint", path_str(&file)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("missing apiVersion"));
}

#[test]
fn test_lint_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(nagare(&["lint", path_str(dir.path())]).status.code(), Some(0));

    let manifest = fs::read_to_string(workflow_file("order-manifest.yaml")).unwrap();
    fs::write(dir.path().join("order.yml"), manifest).unwrap();
    fs::write(dir.path().join("notes.txt"), "not yaml").unwrap();
    let output = nagare(&["lint", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout(&output).contains("notes.txt"));

    fs::write(dir.path().join("broken.yaml"), "kind: Other\n").unwrap();
    assert_eq!(nagare(&["lint", path_str(dir.path())]).status.code(), Some(1));
}

#[test]
fn test_lint_missing_path_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nothing-here");
    assert_eq!(nagare(&["lint", path_str(&missing)]).status.code(), Some(2));
}
