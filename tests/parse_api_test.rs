//! Parse entry point behavior: sync/async surfaces, fault propagation, and
//! result shapes.

use scrutiny::{ParseError, ParseFault, Schema, SchemaExt, SchemaLike, TransformSchema};
use serde_json::json;

#[test]
fn test_parse_returns_transformed_value() {
    let schema = Schema::object()
        .field("email", Schema::string().trim().lower())
        .field("plan", Schema::string().default_to(json!("free")));

    let parsed = schema
        .parse(&json!({"email": "  ADA@Example.COM "}))
        .unwrap();
    assert_eq!(parsed, json!({"email": "ada@example.com", "plan": "free"}));
}

#[test]
fn test_parse_error_carries_all_issues() {
    let schema = Schema::object()
        .field("name", Schema::string().min_len(3))
        .field("age", Schema::integer().non_negative());

    let err = schema.parse(&json!({"name": "ab", "age": -1})).unwrap_err();
    match err {
        ParseError::Invalid(errors) => {
            assert_eq!(errors.len(), 2);
            let paths: Vec<String> = errors.iter().map(|i| i.path.to_string()).collect();
            assert_eq!(paths, vec!["name", "age"]);
        }
        ParseError::Fault(fault) => panic!("unexpected fault: {fault}"),
    }
}

#[test]
fn test_safe_parse_returns_validation() {
    let schema = Schema::string().min_len(2);

    let ok = schema.safe_parse(&json!("hello")).unwrap();
    assert!(ok.is_success());

    let failed = schema.safe_parse(&json!("h")).unwrap();
    assert!(failed.is_failure());
    let errors = failed.into_result().unwrap_err();
    assert_eq!(errors.first().code(), "too_small");
}

#[test]
fn test_sync_parse_rejects_effectful_refinement() {
    let schema = Schema::string().refine_async(|value| {
        // stands in for a database lookup
        value.as_str().is_some_and(|s| s != "taken")
    });

    // both sync surfaces raise the fault eagerly; it is API misuse, not
    // invalid input, so even safe_parse refuses
    assert!(matches!(
        schema.parse(&json!("free-name")),
        Err(ParseError::Fault(ParseFault::AsyncRequired))
    ));
    assert!(matches!(
        schema.safe_parse(&json!("free-name")),
        Err(ParseFault::AsyncRequired)
    ));
}

#[test]
fn test_parse_async_runs_effectful_refinement() {
    let schema = Schema::string().refine_async(|value| {
        value.as_str().is_some_and(|s| s != "taken")
    });

    assert_eq!(
        schema.parse_async(&json!("free-name")).unwrap(),
        json!("free-name")
    );

    let err = schema.parse_async(&json!("taken")).unwrap_err();
    match err {
        ParseError::Invalid(errors) => assert_eq!(errors.first().code(), "custom"),
        ParseError::Fault(fault) => panic!("unexpected fault: {fault}"),
    }
}

#[test]
fn test_effectful_transform_needs_async_entry() {
    let schema = Schema::string().pipe(TransformSchema::effectful(|value, _| {
        // stands in for an enrichment lookup
        json!({ "resolved": value })
    }));

    assert!(matches!(
        schema.parse(&json!("id-1")),
        Err(ParseError::Fault(ParseFault::AsyncRequired))
    ));

    let parsed = schema.parse_async(&json!("id-1")).unwrap();
    assert_eq!(parsed, json!({"resolved": "id-1"}));
}

#[test]
fn test_effectful_validator_nested_in_object_is_detected() {
    let schema = Schema::object().field(
        "email",
        Schema::string().email().refine_async(|_| true),
    );

    assert!(matches!(
        schema.safe_parse(&json!({"email": "a@b.com"})),
        Err(ParseFault::AsyncRequired)
    ));
    assert!(schema
        .safe_parse_async(&json!({"email": "a@b.com"}))
        .unwrap()
        .is_success());
}

#[test]
fn test_async_union_tries_options_in_declaration_order() {
    let union = Schema::union()
        .option(Schema::string().refine_async(|v| v.as_str().is_some_and(|s| s.len() > 3)))
        .option(Schema::string().refine_async(|_| true));

    // both options accept; the first one wins even under parallel evaluation
    assert_eq!(
        union.parse_async(&json!("abcdef")).unwrap(),
        json!("abcdef")
    );

    // first rejects, second accepts
    assert_eq!(union.parse_async(&json!("ab")).unwrap(), json!("ab"));
}

#[test]
fn test_sync_union_stops_before_untried_effectful_option() {
    let union = Schema::union()
        .option(Schema::string())
        .option(Schema::string().refine_async(|_| true));

    // the first option matches, so the effectful second is never touched
    // and the synchronous entry point does not fault
    assert_eq!(union.parse(&json!("x")).unwrap(), json!("x"));

    // when nothing matches, the second option's type check aborts before
    // its effectful refinement is reached: an ordinary union failure
    let err = union.parse(&json!(1)).unwrap_err();
    match err {
        ParseError::Invalid(errors) => assert_eq!(errors.first().code(), "invalid_union"),
        ParseError::Fault(fault) => panic!("unexpected fault: {fault}"),
    }
}

#[test]
fn test_async_array_issue_order_follows_element_order() {
    let schema = Schema::array(Schema::integer().refine_async(|_| true));

    let err = schema.parse_async(&json!(["x", 1, "y"])).unwrap_err();
    match err {
        ParseError::Invalid(errors) => {
            let paths: Vec<String> = errors.iter().map(|i| i.path.to_string()).collect();
            assert_eq!(paths, vec!["[0]", "[2]"]);
        }
        ParseError::Fault(fault) => panic!("unexpected fault: {fault}"),
    }
}

#[test]
fn test_parse_is_idempotent_for_untransformed_schemas() {
    let schema = Schema::object()
        .field("name", Schema::string())
        .field("tags", Schema::array(Schema::string()));

    let input = json!({"name": "a", "tags": ["x", "y"]});
    let once = schema.parse(&input).unwrap();
    let twice = schema.parse(&once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, input);
}

#[test]
fn test_parse_async_handles_pure_schemas_too() {
    let schema = Schema::string().min_len(1);
    assert_eq!(schema.parse_async(&json!("x")).unwrap(), json!("x"));
}

#[test]
fn test_fault_from_contradictory_intersection() {
    let schema = Schema::any()
        .transform(|_, _| json!("left"))
        .and(Schema::any().transform(|_, _| json!("right")));

    assert!(matches!(
        schema.parse(&json!(null)),
        Err(ParseError::Fault(ParseFault::Unmergeable { .. }))
    ));
}

#[test]
fn test_missing_output_surfaces_as_null_at_top_level() {
    // a top-level optional over a present value behaves normally; parse
    // never returns an absent value, so nothing surprising leaks out
    let schema = Schema::string().optional();
    assert_eq!(schema.parse(&json!("x")).unwrap(), json!("x"));
}
