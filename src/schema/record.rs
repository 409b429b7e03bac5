//! Record and map schemas: homogeneous key/value collections.
//!
//! A record is an object whose keys all satisfy one key schema and whose
//! values all satisfy one value schema. When the key schema exposes a
//! finite literal set (an enum), the record iterates that set instead of
//! the input's own keys — every declared key is expected, and input keys
//! outside the set are reported as `unrecognized_keys`.
//!
//! A map is the entry-pair form: an array of `[key, value]` pairs, which
//! is how maps with non-string keys serialize into JSON. Key failures nest
//! under `invalid_key`, value failures under `invalid_element`.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{Issue, IssueKind};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema for objects with a uniform key and value shape.
#[derive(Clone)]
pub struct RecordSchema {
    key_schema: Arc<dyn SchemaLike>,
    value_schema: Arc<dyn SchemaLike>,
    type_error_message: Option<String>,
}

impl RecordSchema {
    /// Creates a record schema from a key schema and a value schema.
    pub fn new(
        key_schema: impl SchemaLike + 'static,
        value_schema: impl SchemaLike + 'static,
    ) -> Self {
        Self {
            key_schema: Arc::new(key_schema),
            value_schema: Arc::new(value_schema),
            type_error_message: None,
        }
    }

    /// Sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Exhaustive validation against a finite key set.
    fn parse_finite_keys(
        &self,
        payload: &mut Payload,
        input: &Map<String, Value>,
        keys: &[Value],
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<Map<String, Value>, ParseFault> {
        let mut output = Map::new();
        let declared: Vec<&str> = keys.iter().filter_map(Value::as_str).collect();

        for key in &declared {
            let field_path = path.push_field(*key);
            let mut child = Payload::new(input.get(*key).cloned());
            self.value_schema.run(&mut child, &field_path, ctx)?;
            if let Some(value) = payload.absorb(child) {
                output.insert((*key).to_string(), value);
            }
        }

        let unrecognized: Vec<String> = input
            .keys()
            .filter(|k| !declared.contains(&k.as_str()))
            .cloned()
            .collect();
        if !unrecognized.is_empty() {
            payload.push(
                Issue::new(
                    IssueKind::UnrecognizedKeys { keys: unrecognized },
                    path.clone(),
                )
                .with_input(Some(Value::Object(input.clone()))),
            );
        }
        Ok(output)
    }

    /// Dynamic validation over the input's own keys.
    fn parse_dynamic_keys(
        &self,
        payload: &mut Payload,
        input: &Map<String, Value>,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<Map<String, Value>, ParseFault> {
        let mut output = Map::new();
        for (key, value) in input {
            let field_path = path.push_field(key);

            let mut key_child = Payload::new(Some(Value::String(key.clone())));
            self.key_schema.run(&mut key_child, &field_path, ctx)?;
            let (key_value, key_issues) = key_child.into_parts();
            if !key_issues.is_empty() {
                payload.push(
                    Issue::new(IssueKind::InvalidKey { issues: key_issues }, field_path)
                        .with_input(Some(Value::String(key.clone()))),
                );
                continue;
            }
            // a key transform (e.g. trim) renames the output key
            let output_key = match key_value {
                Some(Value::String(s)) => s,
                _ => key.clone(),
            };

            let mut value_child = Payload::new(Some(value.clone()));
            self.value_schema.run(&mut value_child, &field_path, ctx)?;
            if let Some(value) = payload.absorb(value_child) {
                output.insert(output_key, value);
            }
        }
        Ok(output)
    }
}

impl SchemaLike for RecordSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let input = match payload.value() {
            Some(Value::Object(map)) => map.clone(),
            _ => {
                let issue = Issue::invalid_type("object", payload.value(), path.clone());
                let issue = match &self.type_error_message {
                    Some(message) => issue.with_message(message),
                    None => issue,
                };
                payload.push(issue);
                return Ok(());
            }
        };

        let output = match self.key_schema.literal_values() {
            Some(keys) => self.parse_finite_keys(payload, &input, &keys, path, ctx)?,
            None => self.parse_dynamic_keys(payload, &input, path, ctx)?,
        };
        payload.set_value(Some(Value::Object(output)));
        Ok(())
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.key_schema.collect_refs(refs);
        self.value_schema.collect_refs(refs);
    }
}

impl ToJsonSchema for RecordSchema {
    fn to_json_schema(&self) -> Value {
        json!({
            "type": "object",
            "propertyNames": self.key_schema.to_json_schema(),
            "additionalProperties": self.value_schema.to_json_schema(),
        })
    }
}

/// A schema for maps in entry-pair form: an array of `[key, value]` pairs
/// with arbitrary JSON keys.
#[derive(Clone)]
pub struct MapSchema {
    key_schema: Arc<dyn SchemaLike>,
    value_schema: Arc<dyn SchemaLike>,
    type_error_message: Option<String>,
}

impl MapSchema {
    /// Creates a map schema from a key schema and a value schema.
    pub fn new(
        key_schema: impl SchemaLike + 'static,
        value_schema: impl SchemaLike + 'static,
    ) -> Self {
        Self {
            key_schema: Arc::new(key_schema),
            value_schema: Arc::new(value_schema),
            type_error_message: None,
        }
    }

    /// Sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }
}

impl SchemaLike for MapSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let entries = match payload.value() {
            Some(Value::Array(entries)) => entries.clone(),
            _ => {
                let issue = Issue::invalid_type("map", payload.value(), path.clone());
                let issue = match &self.type_error_message {
                    Some(message) => issue.with_message(message),
                    None => issue,
                };
                payload.push(issue);
                return Ok(());
            }
        };

        let mut output = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let entry_path = path.push_index(index);
            let pair = match entry {
                Value::Array(pair) if pair.len() == 2 => pair,
                other => {
                    payload.push(Issue::invalid_type(
                        "entry",
                        Some(&other),
                        entry_path.clone(),
                    ));
                    continue;
                }
            };
            let mut pair = pair.into_iter();
            let (raw_key, raw_value) = match (pair.next(), pair.next()) {
                (Some(k), Some(v)) => (k, v),
                _ => unreachable!(),
            };

            let mut key_child = Payload::new(Some(raw_key.clone()));
            self.key_schema.run(&mut key_child, &entry_path.push_index(0), ctx)?;
            let (key_value, key_issues) = key_child.into_parts();
            if !key_issues.is_empty() {
                payload.push(
                    Issue::new(IssueKind::InvalidKey { issues: key_issues }, entry_path)
                        .with_input(Some(raw_key)),
                );
                continue;
            }

            let mut value_child = Payload::new(Some(raw_value.clone()));
            self.value_schema
                .run(&mut value_child, &entry_path.push_index(1), ctx)?;
            let (value_value, value_issues) = value_child.into_parts();
            if !value_issues.is_empty() {
                payload.push(
                    Issue::new(
                        IssueKind::InvalidElement {
                            issues: value_issues,
                        },
                        entry_path,
                    )
                    .with_input(Some(raw_value)),
                );
                continue;
            }

            output.push(Value::Array(vec![
                key_value.unwrap_or(Value::Null),
                value_value.unwrap_or(Value::Null),
            ]));
        }

        payload.set_value(Some(Value::Array(output)));
        Ok(())
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.key_schema.collect_refs(refs);
        self.value_schema.collect_refs(refs);
    }
}

impl ToJsonSchema for MapSchema {
    fn to_json_schema(&self) -> Value {
        json!({
            "type": "array",
            "items": {
                "type": "array",
                "prefixItems": [
                    self.key_schema.to_json_schema(),
                    self.value_schema.to_json_schema(),
                ],
                "minItems": 2,
                "maxItems": 2,
            },
        })
    }
}
