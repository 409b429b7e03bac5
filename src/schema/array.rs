//! Array schema validation.
//!
//! [`ArraySchema`] validates every element against an element schema,
//! prefixing element issues with their index. Under the effectful entry
//! points, elements validate on the rayon pool — they are independent of
//! each other — while issue order still follows element order.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::{json, Value};

use crate::checks::{self, Bag, Check};
use crate::error::Issue;
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema for validating arrays with a uniform element type.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::array(Schema::string().min_len(1)).non_empty();
///
/// assert!(schema.validate(&json!(["a", "b"]), &JsonPath::root()).is_success());
/// assert!(schema.validate(&json!([]), &JsonPath::root()).is_failure());
/// ```
#[derive(Clone)]
pub struct ArraySchema {
    element: Arc<dyn SchemaLike>,
    checks: Vec<Check>,
    bag: Bag,
    type_error_message: Option<String>,
}

impl ArraySchema {
    /// Creates a new array schema with the given element schema.
    pub fn new(element: impl SchemaLike + 'static) -> Self {
        Self {
            element: Arc::new(element),
            checks: Vec::new(),
            bag: Bag::default(),
            type_error_message: None,
        }
    }

    /// Adds a minimum length constraint.
    pub fn min_len(mut self, min: usize) -> Self {
        self.bag.min_length = Some(min);
        self.checks.push(checks::min_length(min));
        self
    }

    /// Adds a maximum length constraint.
    pub fn max_len(mut self, max: usize) -> Self {
        self.bag.max_length = Some(max);
        self.checks.push(checks::max_length(max));
        self
    }

    /// Adds an exact length constraint.
    pub fn len(mut self, len: usize) -> Self {
        self.bag.min_length = Some(len);
        self.bag.max_length = Some(len);
        self.checks.push(checks::exact_length(len));
        self
    }

    /// The array must have at least one item.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Sets a custom error message for the most recent constraint, or the
    /// type error message when no constraints have been added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.checks.last_mut() {
            Some(check) => check.set_message(message),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    /// Attaches a caller-built check.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

impl SchemaLike for ArraySchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let items = match payload.value() {
            Some(Value::Array(items)) => items.clone(),
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

        let children = run_elements(&*self.element, items, path, ctx)?;

        let mut output = Vec::with_capacity(children.len());
        for child in children {
            let value = payload.absorb(child);
            output.push(value.unwrap_or(Value::Null));
        }
        payload.set_value(Some(Value::Array(output)));
        Ok(())
    }

    fn checks(&self) -> &[Check] {
        &self.checks
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.element.collect_refs(refs);
    }
}

impl ToJsonSchema for ArraySchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = json!({
            "type": "array",
            "items": self.element.to_json_schema(),
        });
        if let Some(min) = self.bag.min_length {
            schema["minItems"] = json!(min);
        }
        if let Some(max) = self.bag.max_length {
            schema["maxItems"] = json!(max);
        }
        schema
    }
}

/// Runs the element schema over every item, sequentially in synchronous
/// contexts and on the rayon pool otherwise. Returned payloads are in
/// element order either way.
pub(crate) fn run_elements(
    element: &dyn SchemaLike,
    items: Vec<Value>,
    path: &JsonPath,
    ctx: &ParseContext,
) -> Result<Vec<Payload>, ParseFault> {
    if ctx.allows_effects() && items.len() > 1 {
        items
            .into_par_iter()
            .enumerate()
            .map(|(index, item)| {
                let mut child = Payload::new(Some(item));
                element.run(&mut child, &path.push_index(index), ctx)?;
                Ok(child)
            })
            .collect()
    } else {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let mut child = Payload::new(Some(item));
                element.run(&mut child, &path.push_index(index), ctx)?;
                Ok(child)
            })
            .collect()
    }
}
