//! Object schema validation.
//!
//! [`ObjectSchema`] validates JSON objects field by field, in declaration
//! order, accumulating issues across fields. Field optionality is derived
//! from the field schema itself: a field whose schema accepts an absent
//! value (optional, default, prefault wrappers) may be omitted from the
//! input, and a field whose validation yields an absent result is omitted
//! from the output.
//!
//! Undeclared input keys follow the unknown-key policy: stripped by
//! default, kept verbatim under `passthrough`, reported as a single
//! `unrecognized_keys` issue under `strict`, or validated through a
//! `catchall` schema.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::checks::Check;
use crate::error::{Issue, IssueKind};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// Definition of a field within an object schema.
#[derive(Clone)]
struct FieldDef {
    schema: Arc<dyn SchemaLike>,
    required: bool,
    default: Option<Value>,
}

/// How undeclared input keys are handled.
#[derive(Clone)]
enum UnknownKeys {
    /// Ignore them; they do not appear in the output.
    Strip,
    /// Copy them to the output unvalidated.
    Passthrough,
    /// Report them in a single `unrecognized_keys` issue.
    Reject,
    /// Validate each against a schema and merge the results in.
    Schema(Arc<dyn SchemaLike>),
}

/// A schema for validating JSON objects with typed fields.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaExt, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string().min_len(1))
///     .field("age", Schema::integer().non_negative())
///     .field("email", Schema::string().email().optional());
///
/// let result = schema.validate(&json!({"name": "Alice", "age": 30}), &JsonPath::root());
/// assert!(result.is_success());
///
/// // Missing required field produces an issue at its path
/// let result = schema.validate(&json!({"age": 30}), &JsonPath::root());
/// assert!(result.is_failure());
/// ```
#[derive(Clone)]
pub struct ObjectSchema {
    fields: IndexMap<String, FieldDef>,
    unknown_keys: UnknownKeys,
    checks: Vec<Check>,
    type_error_message: Option<String>,
}

impl ObjectSchema {
    /// Creates a new object schema with no fields.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            unknown_keys: UnknownKeys::Strip,
            checks: Vec::new(),
            type_error_message: None,
        }
    }

    /// Adds a required field. A field whose schema accepts an absent value
    /// is effectively optional regardless.
    pub fn field(mut self, name: impl Into<String>, schema: impl SchemaLike + 'static) -> Self {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Arc::new(schema),
                required: true,
                default: None,
            },
        );
        self
    }

    /// Adds an explicitly optional field: it may be absent from the input
    /// even when its schema would reject an absent value.
    pub fn optional(mut self, name: impl Into<String>, schema: impl SchemaLike + 'static) -> Self {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Arc::new(schema),
                required: false,
                default: None,
            },
        );
        self
    }

    /// Adds an optional field with a default. An absent field takes the
    /// default verbatim; defaults are trusted, not validated.
    pub fn default(
        mut self,
        name: impl Into<String>,
        schema: impl SchemaLike + 'static,
        default: Value,
    ) -> Self {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Arc::new(schema),
                required: false,
                default: Some(default),
            },
        );
        self
    }

    /// Rejects undeclared keys with a single `unrecognized_keys` issue.
    pub fn strict(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Reject;
        self
    }

    /// Copies undeclared keys to the output unvalidated.
    pub fn passthrough(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    /// Validates undeclared keys against `schema` and merges them in.
    pub fn catchall(mut self, schema: impl SchemaLike + 'static) -> Self {
        self.unknown_keys = UnknownKeys::Schema(Arc::new(schema));
        self
    }

    /// Sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Attaches a caller-built check (object-level constraints, property
    /// checks).
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// The schema declared for `name`, if any. Discriminated unions use
    /// this to read their dispatch field.
    pub fn field_schema(&self, name: &str) -> Option<&Arc<dyn SchemaLike>> {
        self.fields.get(name).map(|def| &def.schema)
    }

    fn run_field(
        &self,
        payload: &mut Payload,
        output: &mut Map<String, Value>,
        name: &str,
        def: &FieldDef,
        value: Option<Value>,
        field_path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let mut child = Payload::new(value);
        def.schema.run(&mut child, field_path, ctx)?;
        if let Some(value) = payload.absorb(child) {
            output.insert(name.to_string(), value);
        }
        Ok(())
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for ObjectSchema {
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

        let mut output = Map::new();

        for (name, def) in &self.fields {
            let field_path = path.push_field(name);
            match input.get(name) {
                Some(value) => {
                    self.run_field(
                        payload,
                        &mut output,
                        name,
                        def,
                        Some(value.clone()),
                        &field_path,
                        ctx,
                    )?;
                }
                None => {
                    if let Some(default) = &def.default {
                        // trusted, not re-validated
                        output.insert(name.clone(), default.clone());
                    } else if def.schema.accepts_missing() {
                        // let the wrapper chain decide: a default inside it
                        // may still materialize a value
                        self.run_field(payload, &mut output, name, def, None, &field_path, ctx)?;
                    } else if def.required {
                        // surfaces as invalid_type with received "missing"
                        self.run_field(payload, &mut output, name, def, None, &field_path, ctx)?;
                    }
                    // explicitly optional and absent: the key is omitted
                }
            }
        }

        let mut unrecognized: Vec<String> = Vec::new();
        for (key, value) in &input {
            if self.fields.contains_key(key) {
                continue;
            }
            match &self.unknown_keys {
                UnknownKeys::Strip => {}
                UnknownKeys::Passthrough => {
                    output.insert(key.clone(), value.clone());
                }
                UnknownKeys::Reject => unrecognized.push(key.clone()),
                UnknownKeys::Schema(schema) => {
                    let field_path = path.push_field(key);
                    let mut child = Payload::new(Some(value.clone()));
                    schema.run(&mut child, &field_path, ctx)?;
                    if let Some(value) = payload.absorb(child) {
                        output.insert(key.clone(), value);
                    }
                }
            }
        }
        if !unrecognized.is_empty() {
            payload.push(
                Issue::new(
                    IssueKind::UnrecognizedKeys { keys: unrecognized },
                    path.clone(),
                )
                .with_input(Some(Value::Object(input))),
            );
        }

        payload.set_value(Some(Value::Object(output)));
        Ok(())
    }

    fn checks(&self) -> &[Check] {
        &self.checks
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for def in self.fields.values() {
            def.schema.collect_refs(refs);
        }
        if let UnknownKeys::Schema(schema) = &self.unknown_keys {
            schema.collect_refs(refs);
        }
    }
}

impl ToJsonSchema for ObjectSchema {
    fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, def) in &self.fields {
            properties.insert(name.clone(), def.schema.to_json_schema());
            if def.required && def.default.is_none() && !def.schema.accepts_missing() {
                required.push(json!(name));
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        match &self.unknown_keys {
            UnknownKeys::Reject => schema["additionalProperties"] = json!(false),
            UnknownKeys::Schema(catchall) => {
                schema["additionalProperties"] = catchall.to_json_schema()
            }
            UnknownKeys::Strip | UnknownKeys::Passthrough => {}
        }
        schema
    }
}
