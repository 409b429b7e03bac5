//! Union schemas: plain first-match-wins unions and discriminated unions
//! with constant-time dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde_json::{json, Value};

use crate::error::{Issue, IssueKind};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::object::ObjectSchema;
use super::traits::SchemaLike;

/// A schema accepting any of several options.
///
/// Options are tried in declaration order and the first one that produces
/// zero issues wins — its (possibly transformed) value is adopted. When no
/// option succeeds, a single `invalid_union` issue reports every option's
/// own issue list, in declaration order.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let id = Schema::union()
///     .option(Schema::string().min_len(1))
///     .option(Schema::integer().positive());
///
/// assert!(id.validate(&json!("abc"), &JsonPath::root()).is_success());
/// assert!(id.validate(&json!(42), &JsonPath::root()).is_success());
/// assert!(id.validate(&json!(true), &JsonPath::root()).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct UnionSchema {
    options: Vec<Arc<dyn SchemaLike>>,
}

impl UnionSchema {
    /// Creates a union with no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an option. Order matters: earlier options win ties.
    pub fn option(mut self, schema: impl SchemaLike + 'static) -> Self {
        self.options.push(Arc::new(schema));
        self
    }

    /// Shared tail for union-style resolution: the first option with zero
    /// issues wins and its value is adopted; otherwise one `invalid_union`
    /// issue reports every option's issues in declaration order.
    ///
    /// Synchronous resolution tries options one at a time and stops at the
    /// first match, so later options (including effectful ones) are never
    /// touched once an earlier option accepted. The effectful mode
    /// evaluates all options on the rayon pool — they are independent —
    /// and declaration order still decides the winner.
    pub(crate) fn resolve(
        options: &[Arc<dyn SchemaLike>],
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let input = payload.value().cloned();
        let run_one = |option: &Arc<dyn SchemaLike>| -> Result<Payload, ParseFault> {
            let mut child = Payload::new(input.clone());
            option.run(&mut child, path, ctx)?;
            Ok(child)
        };

        let mut alternatives = Vec::with_capacity(options.len());
        if ctx.allows_effects() && options.len() > 1 {
            let children: Vec<Payload> =
                options.par_iter().map(run_one).collect::<Result<_, _>>()?;
            for child in children {
                if !child.has_issues() {
                    let (value, _) = child.into_parts();
                    payload.set_value(value);
                    return Ok(());
                }
                let (_, issues) = child.into_parts();
                alternatives.push(issues);
            }
        } else {
            for option in options {
                let child = run_one(option)?;
                if !child.has_issues() {
                    let (value, _) = child.into_parts();
                    payload.set_value(value);
                    return Ok(());
                }
                let (_, issues) = child.into_parts();
                alternatives.push(issues);
            }
        }

        payload.push(
            Issue::new(
                IssueKind::InvalidUnion {
                    alternatives,
                    note: None,
                },
                path.clone(),
            )
            .with_input(input),
        );
        Ok(())
    }
}

impl SchemaLike for UnionSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        Self::resolve(&self.options, payload, path, ctx)
    }

    fn accepts_missing(&self) -> bool {
        self.options.iter().any(|option| option.accepts_missing())
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        let mut values = Vec::new();
        for option in &self.options {
            values.extend(option.literal_values()?);
        }
        Some(values)
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for option in &self.options {
            option.collect_refs(refs);
        }
    }
}

impl ToJsonSchema for UnionSchema {
    fn to_json_schema(&self) -> Value {
        json!({
            "anyOf": self.options.iter().map(|o| o.to_json_schema()).collect::<Vec<_>>()
        })
    }
}

/// Errors raised while building a schema definition. These indicate a bug
/// in the schema itself, detected at construction time.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// A discriminated-union option's dispatch field has no statically
    /// known literal values.
    #[error("discriminator '{key}' of option {index} has no literal values")]
    NonLiteralDiscriminator {
        /// The dispatch field name.
        key: String,
        /// The option's declaration index.
        index: usize,
    },

    /// Two options claim the same discriminator value.
    #[error("duplicate discriminator value {value} across options")]
    DuplicateDiscriminator {
        /// The contested literal.
        value: Value,
    },
}

/// A union of object options dispatched in O(1) on a shared literal-valued
/// discriminator field.
///
/// The dispatch map is built at construction time from each option's
/// declared literal values; duplicate values across options are a
/// [`DefinitionError`]. On validation the discriminator is read from the
/// input and only the matching option runs, so its field issues surface
/// directly instead of drowning inside an `invalid_union`.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let shape = Schema::discriminated_union("kind")
///     .option(Schema::object()
///         .field("kind", Schema::literal("circle"))
///         .field("radius", Schema::number().positive()))
///     .unwrap()
///     .option(Schema::object()
///         .field("kind", Schema::literal("rect"))
///         .field("width", Schema::number().positive())
///         .field("height", Schema::number().positive()))
///     .unwrap();
///
/// let result = shape.validate(&json!({"kind": "circle", "radius": 2.0}), &JsonPath::root());
/// assert!(result.is_success());
/// ```
#[derive(Clone)]
pub struct DiscriminatedUnionSchema {
    key: String,
    options: Vec<Arc<dyn SchemaLike>>,
    dispatch: HashMap<String, usize>,
    fallback: bool,
}

/// The dispatch-map key for a literal: its compact JSON rendering, so
/// strings, numbers and booleans never collide.
fn dispatch_key(value: &Value) -> String {
    value.to_string()
}

impl DiscriminatedUnionSchema {
    /// Creates a discriminated union dispatching on `key`, with no options.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: Vec::new(),
            dispatch: HashMap::new(),
            fallback: false,
        }
    }

    /// Appends an object option, registering its discriminator values in
    /// the dispatch map.
    pub fn option(mut self, option: ObjectSchema) -> Result<Self, DefinitionError> {
        let index = self.options.len();
        let values = option
            .field_schema(&self.key)
            .and_then(|schema| schema.literal_values())
            .filter(|values| !values.is_empty())
            .ok_or_else(|| DefinitionError::NonLiteralDiscriminator {
                key: self.key.clone(),
                index,
            })?;

        for value in values {
            if self.dispatch.insert(dispatch_key(&value), index).is_some() {
                return Err(DefinitionError::DuplicateDiscriminator { value });
            }
        }
        self.options.push(Arc::new(option));
        Ok(self)
    }

    /// Falls back to brute-force union behavior when no discriminator
    /// value matches, instead of failing immediately.
    pub fn with_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

impl SchemaLike for DiscriminatedUnionSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let discriminator = match payload.value() {
            Some(Value::Object(map)) => map.get(&self.key).cloned(),
            _ => {
                let issue = Issue::invalid_type("object", payload.value(), path.clone());
                payload.push(issue);
                return Ok(());
            }
        };

        let target = discriminator
            .as_ref()
            .and_then(|value| self.dispatch.get(&dispatch_key(value)))
            .copied();

        match target {
            Some(index) => {
                let input = payload.take_value();
                let mut child = Payload::new(input);
                self.options[index].run(&mut child, path, ctx)?;
                let value = payload.absorb(child);
                payload.set_value(value);
            }
            None if self.fallback => {
                UnionSchema::resolve(&self.options, payload, path, ctx)?;
            }
            None => {
                payload.push(
                    Issue::new(
                        IssueKind::InvalidUnion {
                            alternatives: Vec::new(),
                            note: Some("no matching discriminator".to_string()),
                        },
                        path.push_field(&self.key),
                    )
                    .with_input(discriminator),
                );
            }
        }
        Ok(())
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for option in &self.options {
            option.collect_refs(refs);
        }
    }
}

impl ToJsonSchema for DiscriminatedUnionSchema {
    fn to_json_schema(&self) -> Value {
        json!({
            "anyOf": self.options.iter().map(|o| o.to_json_schema()).collect::<Vec<_>>()
        })
    }
}
