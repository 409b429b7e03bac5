//! Set schema validation.
//!
//! JSON has no set type; a set is an array validated membership-wise whose
//! output is deduplicated in first-occurrence order. Size constraints
//! observe the deduplicated size, not the raw element count.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::checks::{self, Bag, Check};
use crate::error::Issue;
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::array::run_elements;
use super::traits::SchemaLike;

/// A schema for validating arrays as sets of distinct elements.
#[derive(Clone)]
pub struct SetSchema {
    element: Arc<dyn SchemaLike>,
    checks: Vec<Check>,
    bag: Bag,
    type_error_message: Option<String>,
}

impl SetSchema {
    /// Creates a new set schema with the given element schema.
    pub fn new(element: impl SchemaLike + 'static) -> Self {
        Self {
            element: Arc::new(element),
            checks: Vec::new(),
            bag: Bag::default(),
            type_error_message: None,
        }
    }

    /// Adds a minimum size constraint (distinct elements).
    pub fn min_size(mut self, min: usize) -> Self {
        self.bag.min_size = Some(min);
        self.checks.push(checks::min_size(min));
        self
    }

    /// Adds a maximum size constraint (distinct elements).
    pub fn max_size(mut self, max: usize) -> Self {
        self.bag.max_size = Some(max);
        self.checks.push(checks::max_size(max));
        self
    }

    /// Adds an exact size constraint.
    pub fn size(self, size: usize) -> Self {
        self.min_size(size).max_size(size)
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

impl SchemaLike for SetSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let items = match payload.value() {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                let issue = Issue::invalid_type("set", payload.value(), path.clone());
                let issue = match &self.type_error_message {
                    Some(message) => issue.with_message(message),
                    None => issue,
                };
                payload.push(issue);
                return Ok(());
            }
        };

        let children = run_elements(&*self.element, items, path, ctx)?;

        // membership: transformed duplicates collapse, first occurrence wins
        let mut output: Vec<Value> = Vec::with_capacity(children.len());
        for child in children {
            let value = payload.absorb(child);
            let value = value.unwrap_or(Value::Null);
            if !output.contains(&value) {
                output.push(value);
            }
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

impl ToJsonSchema for SetSchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = json!({
            "type": "array",
            "uniqueItems": true,
            "items": self.element.to_json_schema(),
        });
        if let Some(min) = self.bag.min_size {
            schema["minItems"] = json!(min);
        }
        if let Some(max) = self.bag.max_size {
            schema["maxItems"] = json!(max);
        }
        schema
    }
}
