//! Intersection schemas: both branches validate the same input and the
//! outputs deep-merge.
//!
//! A merge conflict is NOT a validation issue. Two branches that both
//! accepted the input but produced irreconcilable values mean the schema
//! definition itself is contradictory, so the conflict surfaces as
//! [`ParseFault::Unmergeable`] — raised, never accumulated.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema requiring the input to satisfy both branches.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaExt, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("id", Schema::integer())
///     .passthrough()
///     .and(Schema::object().field("name", Schema::string()).passthrough());
///
/// let result = schema.validate(&json!({"id": 1, "name": "a"}), &JsonPath::root());
/// assert!(result.is_success());
/// ```
#[derive(Clone)]
pub struct IntersectionSchema {
    left: Arc<dyn SchemaLike>,
    right: Arc<dyn SchemaLike>,
}

impl IntersectionSchema {
    /// Intersects `left` with `right`.
    pub fn new(left: impl SchemaLike + 'static, right: impl SchemaLike + 'static) -> Self {
        Self {
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }
}

impl SchemaLike for IntersectionSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let input = payload.value().cloned();

        let mut left = Payload::new(input.clone());
        self.left.run(&mut left, path, ctx)?;
        let mut right = Payload::new(input);
        self.right.run(&mut right, path, ctx)?;

        if left.has_issues() || right.has_issues() {
            let (_, left_issues) = left.into_parts();
            let (_, right_issues) = right.into_parts();
            for issue in left_issues.into_iter().chain(right_issues) {
                payload.push(issue);
            }
            return Ok(());
        }

        let (left_value, _) = left.into_parts();
        let (right_value, _) = right.into_parts();
        let merged = match (left_value, right_value) {
            (None, None) => None,
            (Some(a), Some(b)) => Some(merge_values(a, b, path)?),
            // one branch yielded a value the other did not: contradictory
            _ => return Err(ParseFault::Unmergeable { path: path.clone() }),
        };
        payload.set_value(merged);
        Ok(())
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.left.collect_refs(refs);
        self.right.collect_refs(refs);
    }
}

impl ToJsonSchema for IntersectionSchema {
    fn to_json_schema(&self) -> Value {
        json!({
            "allOf": [self.left.to_json_schema(), self.right.to_json_schema()]
        })
    }
}

/// Recursively merges two branch outputs.
///
/// Identical values merge trivially; plain objects merge key by key,
/// recursing into shared keys; arrays merge element by element when the
/// lengths match. Anything else is a conflict.
fn merge_values(a: Value, b: Value, path: &JsonPath) -> Result<Value, ParseFault> {
    if a == b {
        return Ok(a);
    }
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged: Map<String, Value> = a;
            for (key, b_value) in b {
                let merged_value = match merged.remove(&key) {
                    Some(a_value) => merge_values(a_value, b_value, &path.push_field(&key))?,
                    None => b_value,
                };
                merged.insert(key, merged_value);
            }
            Ok(Value::Object(merged))
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => {
            let merged: Result<Vec<Value>, ParseFault> = a
                .into_iter()
                .zip(b)
                .enumerate()
                .map(|(index, (a_value, b_value))| {
                    merge_values(a_value, b_value, &path.push_index(index))
                })
                .collect();
            Ok(Value::Array(merged?))
        }
        _ => Err(ParseFault::Unmergeable { path: path.clone() }),
    }
}
