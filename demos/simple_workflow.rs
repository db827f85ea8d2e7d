use nagare::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let workflow = Workflow::builder()
        .add_node(Node::start("begin").then("load"))
        .add_node(Node::log("load", "Loading data for ${input.user}").then("done"))
        .add_node(Node::end("done"))
        .input(json!({"user": "sample"}))
        .build()?;

    let functions = FunctionRegistry::new();
    let mut engine = Engine::new(&workflow, &functions);

    match engine.run().await {
        Ok(summary) => println!("Workflow completed successfully in {} steps", summary.steps),
        Err(error) => println!("Workflow failed: {:?}", error),
    }

    for (key, value) in engine.context().iter() {
        println!("{} = {}", key, value);
    }

    Ok(())
}
