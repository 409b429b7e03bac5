//! Interoperability with external schema formats.

mod json_schema;

pub use json_schema::{format_to_json_schema, ToJsonSchema};
