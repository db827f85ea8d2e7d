//! `nagare` command line.
//!
//! Sub-commands:
//! - `run`  runs a workflow document with the built-in task functions.
//! - `lint` checks workflow manifests without running them.

mod tasks;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use nagare::lint::lint_manifest;
use nagare::loader;
use nagare::{Context, Engine, EngineConfig, Workflow, DEFAULT_MAX_STEPS};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "nagare", about = "Declarative workflow interpreter", version)]
struct Cli {
    /// Tracing filter, e.g. `info` or `nagare=debug`
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a workflow document (YAML or JSON).
    Run {
        path: PathBuf,
        /// JSON value replacing the document's declared input
        #[arg(long)]
        input: Option<String>,
        /// Abort the run after this many steps
        #[arg(long, env = "NAGARE_MAX_STEPS", default_value_t = DEFAULT_MAX_STEPS)]
        max_steps: usize,
        /// Simulate every http node
        #[arg(long)]
        offline: bool,
    },
    /// Check workflow manifests. Directories are searched for *.yaml and *.yml.
    Lint {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Run {
            path,
            input,
            max_steps,
            offline,
        } => {
            let input = match input.as_deref().map(serde_json::from_str::<Value>).transpose() {
                Ok(input) => input,
                Err(e) => {
                    eprintln!("Invalid --input: {e}");
                    return ExitCode::from(USAGE_ERROR);
                }
            };
            let config = EngineConfig {
                max_steps,
                force_simulate_http: offline,
            };

            match run_workflow(&path, input, config).await {
                Ok(context) => {
                    print_context(&context);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Lint { paths } => lint(&paths),
    }
}

async fn run_workflow(path: &Path, input: Option<Value>, config: EngineConfig) -> Result<Context> {
    let document = loader::load_document(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let workflow = Workflow::load(document).context("invalid workflow document")?;
    let functions = tasks::registry();

    let mut engine = Engine::new(&workflow, &functions).with_config(config);
    if let Some(input) = input {
        engine = engine.with_input(input);
    }

    let summary = engine.run().await?;
    info!(
        "Workflow finished after {} steps in {:?}: {:?}",
        summary.steps, summary.elapsed, summary.completion
    );
    Ok(engine.into_context())
}

fn print_context(context: &Context) {
    let map: serde_json::Map<String, Value> = context
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    match serde_json::to_string_pretty(&map) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to render context: {e}"),
    }
}

fn lint(paths: &[PathBuf]) -> ExitCode {
    let mut files = Vec::new();
    for path in paths {
        match manifest_files(path) {
            Ok(found) => files.extend(found),
            Err(e) => {
                eprintln!("Cannot read {}: {e}", path.display());
                return ExitCode::from(USAGE_ERROR);
            }
        }
    }

    if files.is_empty() {
        println!("No YAML files found");
        return ExitCode::SUCCESS;
    }

    let mut total = 0;
    for file in &files {
        println!("-- Linting {} --", file.display());
        let documents = match loader::load_documents(file) {
            Ok(documents) => documents,
            Err(e) => {
                println!(" ERROR: {e}");
                total += 1;
                continue;
            }
        };
        for (index, document) in documents.iter().enumerate() {
            let problems = lint_manifest(document);
            if problems.is_empty() {
                println!(" document[{index}] OK");
                continue;
            }
            total += problems.len();
            println!(" document[{index}] has {} problem(s):", problems.len());
            for problem in &problems {
                println!("  - {problem}");
            }
        }
    }

    if total > 0 {
        println!("Lint finished: {total} problem(s) found");
        return ExitCode::FAILURE;
    }
    println!("Lint finished: no problems found");
    ExitCode::SUCCESS
}

/// `path` itself if it is a file, otherwise its YAML files in name order.
fn manifest_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !fs::metadata(path)?.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let file = entry?.path();
        let is_yaml = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_yaml && file.is_file() {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}
