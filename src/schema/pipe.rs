//! Pipes and transforms.
//!
//! A pipe chains two schemas: the input side runs first, and the output
//! side only runs when the input side did not abort — feeding a garbage
//! value into the output side would produce misleading cascading errors.
//! Non-aborting issues accumulated on the input side are carried along.
//!
//! A transform applies an arbitrary value function. It does not itself
//! validate: the function signals problems by reporting issues through the
//! supplied [`RefineCtx`] rather than by panicking or returning errors.

use std::sync::Arc;

use serde_json::Value;

use crate::checks::RefineCtx;
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// Chains an input schema into an output schema.
#[derive(Clone)]
pub struct PipeSchema {
    input: Arc<dyn SchemaLike>,
    output: Arc<dyn SchemaLike>,
}

impl PipeSchema {
    /// Pipes `input` into `output`.
    pub fn new(input: impl SchemaLike + 'static, output: impl SchemaLike + 'static) -> Self {
        Self {
            input: Arc::new(input),
            output: Arc::new(output),
        }
    }
}

impl SchemaLike for PipeSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        self.input.run(payload, path, ctx)?;
        if payload.aborted() {
            return Ok(());
        }
        self.output.run(payload, path, ctx)
    }

    fn accepts_missing(&self) -> bool {
        self.input.accepts_missing()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.input.collect_refs(refs);
        self.output.collect_refs(refs);
    }
}

impl ToJsonSchema for PipeSchema {
    fn to_json_schema(&self) -> Value {
        // the input side describes what callers must supply
        self.input.to_json_schema()
    }
}

type TransformFn = Arc<dyn Fn(Value, &mut RefineCtx) -> Value + Send + Sync>;

/// Applies a value-to-value function. Usually reached through
/// [`SchemaExt::transform`](crate::SchemaExt::transform), which pipes a
/// validating schema into the transform.
#[derive(Clone)]
pub struct TransformSchema {
    f: TransformFn,
    effectful: bool,
}

impl TransformSchema {
    /// A pure transform.
    pub fn new(f: impl Fn(Value, &mut RefineCtx) -> Value + Send + Sync + 'static) -> Self {
        Self {
            f: Arc::new(f),
            effectful: false,
        }
    }

    /// An effectful transform: it may perform I/O and only runs through
    /// the `parse_async` entry points.
    pub fn effectful(f: impl Fn(Value, &mut RefineCtx) -> Value + Send + Sync + 'static) -> Self {
        Self {
            f: Arc::new(f),
            effectful: true,
        }
    }
}

impl SchemaLike for TransformSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if self.effectful && !ctx.allows_effects() {
            return Err(ParseFault::AsyncRequired);
        }
        let Some(value) = payload.take_value() else {
            return Ok(());
        };
        let mut refine = RefineCtx::new(path);
        let transformed = (self.f)(value, &mut refine);
        payload.set_value(Some(transformed));
        for issue in refine.into_issues() {
            payload.push(issue);
        }
        Ok(())
    }

    fn accepts_missing(&self) -> bool {
        // absent values pass through untransformed
        true
    }
}

impl ToJsonSchema for TransformSchema {
    fn to_json_schema(&self) -> Value {
        serde_json::json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, SchemaExt};
    use serde_json::json;

    #[test]
    fn test_pipe_runs_both_sides() {
        // string -> trim -> length-checked string
        let schema = Schema::string().trim().pipe(Schema::string().min_len(3));
        assert!(schema.validate(&json!("  abc "), &JsonPath::root()).is_success());

        let errors = schema
            .validate(&json!("  a "), &JsonPath::root())
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first().code(), "too_small");
    }

    #[test]
    fn test_pipe_short_circuits_on_aborted_input() {
        let schema = Schema::string().pipe(Schema::integer());
        let errors = schema
            .validate(&json!(17), &JsonPath::root())
            .into_result()
            .unwrap_err();
        // only the input side's type issue; the output side never ran
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().code(), "invalid_type");
    }

    #[test]
    fn test_transform_changes_value() {
        let schema = Schema::string().transform(|value, _| match value {
            Value::String(s) => json!(s.chars().count()),
            other => other,
        });
        assert_eq!(
            schema
                .validate(&json!("hello"), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!(5)
        );
    }

    #[test]
    fn test_transform_reports_issues_via_ctx() {
        let schema = Schema::string().transform(|value, refine| {
            let s = value.as_str().unwrap_or_default();
            match s.parse::<i64>() {
                Ok(n) => json!(n),
                Err(_) => {
                    refine.add_issue("not a numeric string");
                    value
                }
            }
        });

        assert_eq!(
            schema
                .validate(&json!("42"), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!(42)
        );

        let errors = schema
            .validate(&json!("nope"), &JsonPath::root())
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first().code(), "custom");
        assert_eq!(errors.first().message(), "not a numeric string");
    }

    #[test]
    fn test_transforms_chain_in_order() {
        let schema = Schema::string()
            .transform(|v, _| json!(format!("a{}", v.as_str().unwrap_or_default())))
            .transform(|v, _| json!(format!("{}z", v.as_str().unwrap_or_default())));
        assert_eq!(
            schema
                .validate(&json!("mid"), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!("amidz")
        );
    }
}
