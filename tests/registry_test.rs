//! Registry behavior: registration, lookup, reference integrity, and
//! registry-driven validation.

use scrutiny::{RegistryError, Schema, SchemaRegistry};
use serde_json::json;

#[test]
fn test_register_and_get() {
    let registry = SchemaRegistry::new();
    registry.register("Email", Schema::string().email()).unwrap();

    assert!(registry.get("Email").is_some());
    assert!(registry.get("Unknown").is_none());
}

#[test]
fn test_duplicate_registration_fails() {
    let registry = SchemaRegistry::new();
    registry.register("Email", Schema::string()).unwrap();

    let result = registry.register("Email", Schema::string());
    assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "Email"));
}

#[test]
fn test_validate_against_named_schema() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "User",
            Schema::object()
                .field("name", Schema::string().min_len(1))
                .field("age", Schema::integer().non_negative()),
        )
        .unwrap();

    let result = registry
        .validate("User", &json!({"name": "Ada", "age": 36}))
        .unwrap();
    assert!(result.is_success());

    let result = registry.validate("User", &json!({"name": "", "age": -1})).unwrap();
    let errors = result.into_result().unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_validate_unknown_schema_errors() {
    let registry = SchemaRegistry::new();
    let result = registry.validate("Nope", &json!(1));
    assert!(matches!(result, Err(RegistryError::SchemaNotFound(_))));
}

#[test]
fn test_references_resolve_through_registry() {
    let registry = SchemaRegistry::new();
    registry.register("UserId", Schema::integer().positive()).unwrap();
    registry
        .register(
            "User",
            Schema::object()
                .field("id", Schema::ref_("UserId"))
                .field("name", Schema::string()),
        )
        .unwrap();

    let result = registry
        .validate("User", &json!({"id": 7, "name": "Ada"}))
        .unwrap();
    assert!(result.is_success());

    let errors = registry
        .validate("User", &json!({"id": -7, "name": "Ada"}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(errors.first().code(), "too_small");
    assert_eq!(errors.first().path.to_string(), "id");
}

#[test]
fn test_validate_refs_finds_unresolved_names() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "User",
            Schema::object()
                .field("id", Schema::ref_("UserId"))
                .field("org", Schema::ref_("Org")),
        )
        .unwrap();
    registry.register("Org", Schema::object()).unwrap();

    assert_eq!(registry.validate_refs(), vec!["UserId"]);
}

#[test]
fn test_validate_refs_ok_when_complete() {
    let registry = SchemaRegistry::new();
    registry.register("Id", Schema::integer()).unwrap();
    registry
        .register("Holder", Schema::object().field("id", Schema::ref_("Id")))
        .unwrap();

    assert!(registry.validate_refs().is_empty());
}

#[test]
fn test_registry_export_includes_defs() {
    let registry = SchemaRegistry::new();
    registry.register("UserId", Schema::integer().positive()).unwrap();
    registry
        .register("User", Schema::object().field("id", Schema::ref_("UserId")))
        .unwrap();

    let document = registry.to_json_schema();
    assert_eq!(
        document["$schema"],
        json!("https://json-schema.org/draft/2020-12/schema")
    );
    assert!(document["$defs"]["UserId"].is_object());
    assert_eq!(
        document["$defs"]["User"]["properties"]["id"]["$ref"],
        json!("#/$defs/UserId")
    );

    let standalone = registry.export_schema("User").unwrap();
    assert!(standalone["$defs"]["UserId"].is_object());
    assert!(registry.export_schema("Missing").is_none());
}

#[test]
fn test_registry_clones_share_storage() {
    let registry = SchemaRegistry::new();
    let clone = registry.clone();
    registry.register("Late", Schema::string()).unwrap();
    assert!(clone.get("Late").is_some());
}

#[test]
fn test_concurrent_validation() {
    use std::sync::Arc;

    let registry = Arc::new(SchemaRegistry::new());
    registry
        .register("Tag", Schema::string().min_len(1).max_len(16))
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let value = json!(format!("tag-{i}"));
                registry.validate("Tag", &value).unwrap().is_success()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
