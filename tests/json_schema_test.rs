//! JSON Schema export built from structure and bag metadata.

use scrutiny::{Schema, SchemaExt, ToJsonSchema};
use serde_json::json;

#[test]
fn test_string_export_carries_bag() {
    let exported = Schema::string().min_len(2).max_len(8).to_json_schema();
    assert_eq!(
        exported,
        json!({"type": "string", "minLength": 2, "maxLength": 8})
    );
}

#[test]
fn test_string_format_mapping() {
    assert_eq!(Schema::string().email().to_json_schema()["format"], json!("email"));
    assert_eq!(Schema::string().url().to_json_schema()["format"], json!("uri"));
    assert_eq!(
        Schema::string().datetime().to_json_schema()["format"],
        json!("date-time")
    );
}

#[test]
fn test_pattern_export() {
    let exported = Schema::string().pattern(r"^\d+$").unwrap().to_json_schema();
    assert_eq!(exported["pattern"], json!(r"^\d+$"));
}

#[test]
fn test_numeric_export() {
    let exported = Schema::integer().min(0).max(100).to_json_schema();
    assert_eq!(
        exported,
        json!({"type": "integer", "minimum": 0, "maximum": 100})
    );

    let exported = Schema::number().gt(0.0).to_json_schema();
    assert_eq!(exported["exclusiveMinimum"], json!(0.0));
}

#[test]
fn test_object_export_with_required_and_additional() {
    let exported = Schema::object()
        .field("id", Schema::integer())
        .field("nick", Schema::string().optional())
        .strict()
        .to_json_schema();

    assert_eq!(exported["type"], json!("object"));
    assert_eq!(exported["required"], json!(["id"]));
    assert_eq!(exported["additionalProperties"], json!(false));
    assert_eq!(exported["properties"]["nick"]["type"], json!("string"));
}

#[test]
fn test_catchall_export() {
    let exported = Schema::object().catchall(Schema::integer()).to_json_schema();
    assert_eq!(exported["additionalProperties"]["type"], json!("integer"));
}

#[test]
fn test_array_and_tuple_export() {
    let exported = Schema::array(Schema::string()).min_len(1).to_json_schema();
    assert_eq!(exported["items"]["type"], json!("string"));
    assert_eq!(exported["minItems"], json!(1));

    let exported = Schema::tuple()
        .item(Schema::string())
        .item(Schema::integer().optional())
        .to_json_schema();
    assert_eq!(exported["prefixItems"][0]["type"], json!("string"));
    assert_eq!(exported["minItems"], json!(1));
    assert_eq!(exported["maxItems"], json!(2));
}

#[test]
fn test_union_and_nullable_export() {
    let exported = Schema::union()
        .option(Schema::string())
        .option(Schema::integer())
        .to_json_schema();
    assert_eq!(exported["anyOf"][0]["type"], json!("string"));
    assert_eq!(exported["anyOf"][1]["type"], json!("integer"));

    let exported = Schema::string().nullable().to_json_schema();
    assert_eq!(exported["oneOf"][0]["type"], json!("null"));
}

#[test]
fn test_literal_and_enum_export() {
    assert_eq!(
        Schema::literal("on").to_json_schema(),
        json!({"const": "on"})
    );
    assert_eq!(
        Schema::enumeration(["a", "b"]).to_json_schema(),
        json!({"enum": ["a", "b"]})
    );
}

#[test]
fn test_default_export() {
    let exported = Schema::string().default_to(json!("u")).to_json_schema();
    assert_eq!(exported["default"], json!("u"));
}

#[test]
fn test_record_export() {
    let exported = Schema::record(Schema::string().min_len(1), Schema::integer()).to_json_schema();
    assert_eq!(exported["propertyNames"]["minLength"], json!(1));
    assert_eq!(exported["additionalProperties"]["type"], json!("integer"));
}

#[test]
fn test_set_export_is_unique_array() {
    let exported = Schema::set(Schema::string()).min_size(1).to_json_schema();
    assert_eq!(exported["uniqueItems"], json!(true));
    assert_eq!(exported["minItems"], json!(1));
}

#[test]
fn test_intersection_export() {
    let exported = Schema::object()
        .field("a", Schema::string())
        .and(Schema::object().field("b", Schema::integer()))
        .to_json_schema();
    assert_eq!(exported["allOf"][0]["properties"]["a"]["type"], json!("string"));
}
