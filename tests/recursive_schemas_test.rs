//! Recursive schema graphs through registry references.

use scrutiny::{Schema, SchemaExt, SchemaRegistry};
use serde_json::json;

fn tree_registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "Node",
            Schema::object()
                .field("value", Schema::integer())
                .field("children", Schema::array(Schema::ref_("Node")).optional()),
        )
        .unwrap();
    registry
}

#[test]
fn test_recursive_tree_validates() {
    let registry = tree_registry();
    let input = json!({
        "value": 1,
        "children": [
            {"value": 2},
            {"value": 3, "children": [{"value": 4}]},
        ],
    });

    let result = registry.validate("Node", &input).unwrap();
    assert!(result.is_success());
}

#[test]
fn test_recursive_failure_carries_deep_path() {
    let registry = tree_registry();
    let input = json!({
        "value": 1,
        "children": [{"value": "not a number"}],
    });

    let errors = registry
        .validate("Node", &input)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(errors.first().path.to_string(), "children[0].value");
    assert_eq!(errors.first().code(), "invalid_type");
}

#[test]
fn test_mutually_recursive_schemas() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "Person",
            Schema::object()
                .field("name", Schema::string())
                .field("pet", Schema::ref_("Pet").optional()),
        )
        .unwrap();
    registry
        .register(
            "Pet",
            Schema::object()
                .field("species", Schema::string())
                .field("owner", Schema::ref_("Person").optional()),
        )
        .unwrap();

    let input = json!({
        "name": "Ada",
        "pet": {"species": "cat", "owner": {"name": "Ada"}},
    });
    assert!(registry.validate("Person", &input).unwrap().is_success());
}

#[test]
fn test_depth_limit_stops_runaway_recursion() {
    // a schema that is nothing but a reference to itself can never
    // terminate; the depth guard reports instead of recursing forever
    let registry = SchemaRegistry::new().with_max_depth(10);
    registry.register("Loop", Schema::ref_("Loop")).unwrap();

    let errors = registry
        .validate("Loop", &json!(1))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert!(errors.first().message().contains("maximum reference depth"));
}

#[test]
fn test_deep_but_finite_input_within_limit() {
    let registry = tree_registry();

    // depth ~20 nesting, well within the default limit
    let mut node = json!({"value": 0});
    for i in 1..20 {
        node = json!({"value": i, "children": [node]});
    }
    assert!(registry.validate("Node", &node).unwrap().is_success());
}

#[test]
fn test_json_value_schema() {
    // the classic self-referential schema: a JSON value
    let registry = SchemaRegistry::new();
    registry
        .register(
            "Json",
            Schema::union()
                .option(Schema::null())
                .option(Schema::boolean())
                .option(Schema::number())
                .option(Schema::string())
                .option(Schema::array(Schema::ref_("Json")))
                .option(Schema::record(Schema::string(), Schema::ref_("Json"))),
        )
        .unwrap();

    let input = json!({"a": [1, "two", null, {"b": true}]});
    assert!(registry.validate("Json", &input).unwrap().is_success());

    assert!(registry.validate("Json", &json!(null)).unwrap().is_success());
}
