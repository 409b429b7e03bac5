//! Tuple schema validation: fixed positional items plus an optional rest.

use std::sync::Arc;

use serde_json::{json, Number, Value};

use crate::error::{Issue, IssueKind};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema for arrays with per-position item schemas.
///
/// Trailing items whose schemas accept an absent value form an optional
/// suffix: the required minimum length shrinks accordingly. Extra elements
/// beyond the declared items are validated against the `rest` schema when
/// one is configured, and rejected otherwise.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaExt, SchemaLike};
/// use serde_json::json;
///
/// let point = Schema::tuple()
///     .item(Schema::number())
///     .item(Schema::number())
///     .item(Schema::string().optional());
///
/// assert!(point.validate(&json!([1.0, 2.0]), &JsonPath::root()).is_success());
/// assert!(point.validate(&json!([1.0, 2.0, "label"]), &JsonPath::root()).is_success());
/// assert!(point.validate(&json!([1.0]), &JsonPath::root()).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct TupleSchema {
    items: Vec<Arc<dyn SchemaLike>>,
    rest: Option<Arc<dyn SchemaLike>>,
    type_error_message: Option<String>,
}

impl TupleSchema {
    /// Creates an empty tuple schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional item schema.
    pub fn item(mut self, schema: impl SchemaLike + 'static) -> Self {
        self.items.push(Arc::new(schema));
        self
    }

    /// Sets the schema for trailing elements beyond the declared items.
    pub fn rest(mut self, schema: impl SchemaLike + 'static) -> Self {
        self.rest = Some(Arc::new(schema));
        self
    }

    /// Sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// The declared item count minus the trailing optional suffix.
    fn required_len(&self) -> usize {
        let optional_suffix = self
            .items
            .iter()
            .rev()
            .take_while(|item| item.accepts_missing())
            .count();
        self.items.len() - optional_suffix
    }
}

impl SchemaLike for TupleSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let values = match payload.value() {
            Some(Value::Array(values)) => values.clone(),
            _ => {
                let issue = Issue::invalid_type("array", payload.value(), path.clone());
                let issue = match &self.type_error_message {
                    Some(message) => issue.with_message(message),
                    None => issue,
                };
                payload.push(issue);
                return Ok(());
            }
        };

        let required = self.required_len();
        if values.len() < required {
            payload.push(
                Issue::new(
                    IssueKind::TooSmall {
                        origin: "array",
                        minimum: Number::from(required),
                        inclusive: true,
                    },
                    path.clone(),
                )
                .with_input(Some(Value::Array(values.clone()))),
            );
            return Ok(());
        }
        if values.len() > self.items.len() && self.rest.is_none() {
            payload.push(
                Issue::new(
                    IssueKind::TooBig {
                        origin: "array",
                        maximum: Number::from(self.items.len()),
                        inclusive: true,
                    },
                    path.clone(),
                )
                .with_input(Some(Value::Array(values.clone()))),
            );
            return Ok(());
        }

        let mut output = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            let schema = match self.items.get(index) {
                Some(item) => item,
                None => self.rest.as_ref().unwrap_or_else(|| unreachable!()),
            };
            let mut child = Payload::new(Some(value));
            schema.run(&mut child, &path.push_index(index), ctx)?;
            if let Some(value) = payload.absorb(child) {
                output.push(value);
            }
        }
        payload.set_value(Some(Value::Array(output)));
        Ok(())
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for item in &self.items {
            item.collect_refs(refs);
        }
        if let Some(rest) = &self.rest {
            rest.collect_refs(refs);
        }
    }
}

impl ToJsonSchema for TupleSchema {
    fn to_json_schema(&self) -> Value {
        let prefix: Vec<Value> = self.items.iter().map(|i| i.to_json_schema()).collect();
        let mut schema = json!({
            "type": "array",
            "prefixItems": prefix,
            "minItems": self.required_len(),
        });
        match &self.rest {
            Some(rest) => schema["items"] = rest.to_json_schema(),
            None => schema["maxItems"] = json!(self.items.len()),
        }
        schema
    }
}
