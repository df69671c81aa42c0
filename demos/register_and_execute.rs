use std::collections::HashMap;

use funcreg::{Function, Registry, UpdateRequest};

fn main() {
    pretty_env_logger::init();

    let registry = Registry::new();

    registry
        .create(Function {
            name: "line".to_string(),
            inputs: vec!["x".to_string()],
            outputs: vec!["y".to_string()],
            parameters: HashMap::from([("a".to_string(), 2.0), ("b".to_string(), 1.0)]),
            expression: "a * x + b".to_string(),
        })
        .unwrap();

    let inputs = HashMap::from([("x".to_string(), 3.0)]);
    let result = registry.execute("line", &inputs).unwrap();
    println!("{} = {}", result.output, result.value);

    // Steepen the slope; 'b' stays as it was.
    registry
        .update(
            "line",
            UpdateRequest {
                parameters: Some(HashMap::from([("a".to_string(), 10.0)])),
                expression: None,
            },
        )
        .unwrap();

    let result = registry.execute("line", &inputs).unwrap();
    println!("{} = {}", result.output, result.value);

    println!("registered: {:?}", registry.list());

    registry.delete("line").unwrap();
    println!("registered after delete: {:?}", registry.list());

    // Ad-hoc evaluation without registering anything.
    let context = HashMap::from([("r".to_string(), 2.0)]);
    let area = funcreg::evaluate_expression("3.14159265 * r ^ 2", &context).unwrap();
    println!("area = {area}");
}
