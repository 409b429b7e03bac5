//! JSON Schema interoperability.
//!
//! Every schema type can describe itself as a JSON Schema document
//! (draft 2020-12), built from its structural definition and the bag
//! metadata its checks recorded at attach time. Export only: this layer is
//! never consulted on the validation hot path, and importing JSON Schema
//! documents is out of scope.

use serde_json::Value;

/// Trait for converting schema types to JSON Schema format.
pub trait ToJsonSchema {
    /// Converts this schema to a JSON Schema representation following
    /// draft 2020-12.
    fn to_json_schema(&self) -> Value;
}

/// Maps an internal format tag to its JSON Schema `format` string.
pub fn format_to_json_schema(format: &str) -> &str {
    match format {
        "email" => "email",
        "url" => "uri",
        "uuid" => "uuid",
        "date" => "date",
        "datetime" => "date-time",
        "ipv4" => "ipv4",
        "ipv6" => "ipv6",
        _ => "string",
    }
}
