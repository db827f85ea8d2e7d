use nagare::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// Data structures
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Order {
    id: String,
    customer_id: String,
    items: Vec<OrderItem>,
    payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OrderItem {
    product_id: String,
    quantity: u32,
    price: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PaymentMethod {
    CreditCard,
    BankTransfer,
}

fn order_from(args: &Arguments) -> Result<Order, BoxError> {
    let order = args.bind("order").ok_or("order is required")?;
    Ok(serde_json::from_value(order.clone())?)
}

// Order validation
fn validate_order(args: Arguments) -> Result<Value, BoxError> {
    println!("Validating order...");
    let order = order_from(&args)?;

    if order.items.is_empty() {
        return Err("Order must contain at least one item".into());
    }
    let total: f64 = order
        .items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();
    if total <= 0.0 {
        return Err("Invalid order amount".into());
    }

    Ok(json!({"result": format!("{:.2}", total), "total": total}))
}

// Payment processing
fn process_payment(args: Arguments) -> Result<Value, BoxError> {
    println!("Processing payment...");
    let order = order_from(&args)?;

    let (transaction_id, status) = match order.payment_method {
        PaymentMethod::CreditCard => ("CC-TRANS-123", "SUCCESS"),
        PaymentMethod::BankTransfer => ("BT-TRANS-456", "PENDING"),
    };

    Ok(json!({
        "result": status,
        "transaction_id": transaction_id,
        "order_id": order.id,
    }))
}

// Shipping arrangement
fn arrange_shipping(args: Arguments) -> Result<Value, BoxError> {
    let customer = args.bind_str("customer").ok_or("customer is required")?;
    println!("Arranging shipping for {}...", customer);

    Ok(json!({"result": "TRACK-123456", "estimated_delivery": "2024-12-31"}))
}

// `${...}` renders to text, so the order goes in as a literal argument
fn workflow_document(order: &Order) -> Result<Value, serde_json::Error> {
    let order = serde_json::to_value(order)?;
    Ok(json!({
        "id": "order-processing",
        "input": {"customer": order["customer_id"].clone()},
        "states": [
            {"name": "received", "type": "event", "transition": "validate"},
            {
                "name": "validate",
                "type": "operation",
                "actions": [{"functionRef": {"refName": "validate_order", "arguments": {"order": order.clone()}}}],
                "transition": "pay"
            },
            {
                "name": "pay",
                "type": "operation",
                "actions": [{"functionRef": {"refName": "process_payment", "arguments": {"order": order.clone()}}}],
                "transition": "ship"
            },
            {
                "name": "ship",
                "type": "operation",
                "actions": [{"functionRef": {"refName": "arrange_shipping", "arguments": {"customer": "${input.customer}"}}}],
                "transition": "notify"
            },
            {
                "name": "notify",
                "type": "inject",
                "data": {"message": "Order ${pay.order_id} paid (${pay.result}), total ${validate.result}, tracking ${ship.result}"},
                "transition": "completed"
            },
            {"name": "completed", "type": "event", "end": true}
        ]
    }))
}

fn registry() -> FunctionRegistry {
    FunctionRegistry::new()
        .with("validate_order", validate_order)
        .with("process_payment", process_payment)
        .with("arrange_shipping", arrange_shipping)
}

fn sample_order() -> Order {
    Order {
        id: "ORDER-001".to_string(),
        customer_id: "CUST-001".to_string(),
        items: vec![
            OrderItem {
                product_id: "PROD-001".to_string(),
                quantity: 2,
                price: 100.0,
            },
            OrderItem {
                product_id: "PROD-002".to_string(),
                quantity: 1,
                price: 150.0,
            },
        ],
        payment_method: PaymentMethod::CreditCard,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let workflow = Workflow::load(workflow_document(&sample_order())?)?;
    let functions = registry();

    let mut engine = Engine::new(&workflow, &functions);
    match engine.run().await {
        Ok(summary) => {
            println!(
                "Order processing completed in {} steps ({:?})",
                summary.steps, summary.elapsed
            );
            if let Some(notification) = engine.context().get("notify") {
                println!("{}", notification["result"]);
            }
        }
        Err(error) => println!("Order processing failed: {}", error),
    }

    Ok(())
}
