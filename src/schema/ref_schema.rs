//! Schema references: the indirection that breaks recursive definitions.
//!
//! A [`RefSchema`] names a schema stored in a registry instead of holding
//! it directly, so a schema graph can refer to itself (a JSON-value schema
//! containing JSON values, a tree node containing tree nodes). Resolution
//! happens during validation through the registry carried by the
//! [`ParseContext`], with a depth guard against unbounded recursion.

use serde_json::{json, Value};

use crate::error::{Issue, IssueKind};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema that references another schema by name.
///
/// References only resolve when validation runs through a registry (see
/// [`SchemaRegistry::validate`](crate::SchemaRegistry::validate));
/// validating one without a registry reports an issue naming the problem.
pub struct RefSchema {
    name: String,
}

impl RefSchema {
    /// Creates a new schema reference; usually via `Schema::ref_()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name of the referenced schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn push_resolution_issue(&self, payload: &mut Payload, path: &JsonPath, message: String) {
        payload.push(Issue::new(IssueKind::Custom { params: None }, path.clone()).with_message(message));
    }
}

impl SchemaLike for RefSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let Some(registry) = ctx.registry() else {
            self.push_resolution_issue(
                payload,
                path,
                format!(
                    "reference to '{}' cannot be validated without a registry; \
                     use SchemaRegistry::validate",
                    self.name
                ),
            );
            return Ok(());
        };

        if ctx.depth() >= ctx.max_depth() {
            self.push_resolution_issue(
                payload,
                path,
                format!(
                    "maximum reference depth {} exceeded at '{}'",
                    ctx.max_depth(),
                    path
                ),
            );
            return Ok(());
        }

        let Some(schema) = registry.get_schema(&self.name) else {
            self.push_resolution_issue(
                payload,
                path,
                format!("schema '{}' not found in registry", self.name),
            );
            return Ok(());
        };

        schema.run(payload, path, &ctx.increment_depth())
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        refs.push(self.name.clone());
    }
}

impl ToJsonSchema for RefSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "$ref": format!("#/$defs/{}", self.name) })
    }
}
