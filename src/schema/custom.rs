//! Custom predicate schemas and refinement wrappers.

use std::sync::Arc;

use serde_json::Value;

use crate::checks::{self, Check};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A standalone predicate schema: accepts any value the predicate accepts.
///
/// The structural parse accepts everything; the predicate runs as an
/// attached check, so `.error(...)` and abort semantics work the same way
/// they do for built-in constraints.
#[derive(Clone)]
pub struct CustomSchema {
    checks: Vec<Check>,
}

impl CustomSchema {
    /// Creates a schema from a predicate; a falsy result produces one
    /// `custom` issue.
    pub fn new(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            checks: vec![checks::custom(test, None)],
        }
    }

    /// Like [`CustomSchema::new`], attaching caller-supplied params that
    /// surface on the issue.
    pub fn with_params(
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
        params: Value,
    ) -> Self {
        Self {
            checks: vec![checks::custom(test, Some(params))],
        }
    }

    /// Sets the error message for the most recent check.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(check) = self.checks.last_mut() {
            check.set_message(message);
        }
        self
    }

    /// Attaches a caller-built check.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

impl SchemaLike for CustomSchema {
    fn parse_value(
        &self,
        _payload: &mut Payload,
        _path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        Ok(())
    }

    fn checks(&self) -> &[Check] {
        &self.checks
    }
}

impl ToJsonSchema for CustomSchema {
    fn to_json_schema(&self) -> Value {
        serde_json::json!({})
    }
}

/// A schema plus refinement checks layered on top of it.
///
/// Produced by [`SchemaExt::refine`](crate::SchemaExt::refine) and
/// friends: the inner schema runs in full (its own parse and checks), then
/// the refinements run under the usual checks-runner rules — an aborting
/// inner issue skips them.
#[derive(Clone)]
pub struct RefinedSchema {
    inner: Arc<dyn SchemaLike>,
    checks: Vec<Check>,
}

impl RefinedSchema {
    /// Wraps `inner` with an empty refinement list.
    pub fn new(inner: impl SchemaLike + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            checks: Vec::new(),
        }
    }

    /// Attaches a check and returns self for chaining.
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Sets the error message for the most recent refinement.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(check) = self.checks.last_mut() {
            check.set_message(message);
        }
        self
    }

    /// Marks the most recent refinement as aborting: an issue from it
    /// stops later refinements.
    pub fn abort(mut self) -> Self {
        if let Some(check) = self.checks.pop() {
            self.checks.push(check.aborting());
        }
        self
    }

    /// Attaches a run-condition predicate to the most recent refinement,
    /// letting it run (or not) independently of prior abort state.
    pub fn when(mut self, when: impl Fn(&Payload) -> bool + Send + Sync + 'static) -> Self {
        if let Some(check) = self.checks.pop() {
            self.checks.push(check.with_when(when));
        }
        self
    }
}

impl SchemaLike for RefinedSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        self.inner.run(payload, path, ctx)
    }

    fn checks(&self) -> &[Check] {
        &self.checks
    }

    fn accepts_missing(&self) -> bool {
        self.inner.accepts_missing()
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        self.inner.literal_values()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }
}

impl ToJsonSchema for RefinedSchema {
    fn to_json_schema(&self) -> Value {
        self.inner.to_json_schema()
    }
}
