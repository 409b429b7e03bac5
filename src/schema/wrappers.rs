//! Wrapper schemas governing absent and null values.
//!
//! Each wrapper holds a single child schema and decides how the value slot
//! interacts with it. The slot is an `Option<serde_json::Value>`: `None`
//! models an absent object key, `Some(Value::Null)` an explicit null.
//!
//! The semantics that matter:
//! - [`DefaultSchema`] substitutes its value WITHOUT validating it through
//!   the inner schema; defaults are trusted.
//! - [`PrefaultSchema`] substitutes its value and DOES validate it; the
//!   substitute is a raw form that still needs normalization.
//! - [`CatchSchema`] discards inner failures entirely and substitutes a
//!   computed fallback; the discarded errors are still handed to the
//!   fallback for logging or diagnostics.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{Issue, IssueKind, SchemaErrors};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// Treats an absent value as valid; anything present is delegated to the
/// inner schema. Chained optionals always delegate.
#[derive(Clone)]
pub struct OptionalSchema {
    inner: Arc<dyn SchemaLike>,
}

impl OptionalSchema {
    /// Wraps `inner` in optional semantics.
    pub fn new(inner: impl SchemaLike + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl SchemaLike for OptionalSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if self.inner.accepts_missing() {
            return self.inner.run(payload, path, ctx);
        }
        if payload.value().is_none() {
            return Ok(());
        }
        self.inner.run(payload, path, ctx)
    }

    fn accepts_missing(&self) -> bool {
        true
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        self.inner.literal_values()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }
}

impl ToJsonSchema for OptionalSchema {
    fn to_json_schema(&self) -> Value {
        // absence is an object-level concern; the value shape is the inner's
        self.inner.to_json_schema()
    }
}

/// Treats an explicit `null` as valid; anything else is delegated.
#[derive(Clone)]
pub struct NullableSchema {
    inner: Arc<dyn SchemaLike>,
}

impl NullableSchema {
    /// Wraps `inner` in nullable semantics.
    pub fn new(inner: impl SchemaLike + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl SchemaLike for NullableSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if payload.value() == Some(&Value::Null) {
            return Ok(());
        }
        self.inner.run(payload, path, ctx)
    }

    fn accepts_missing(&self) -> bool {
        self.inner.accepts_missing()
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        let mut values = self.inner.literal_values()?;
        values.push(Value::Null);
        Some(values)
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }
}

impl ToJsonSchema for NullableSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "oneOf": [ { "type": "null" }, self.inner.to_json_schema() ] })
    }
}

/// Substitutes a trusted default for an absent value, skipping the inner
/// schema entirely; when the inner schema itself yields an absent result,
/// the default is re-applied after validation.
#[derive(Clone)]
pub struct DefaultSchema {
    inner: Arc<dyn SchemaLike>,
    value: Value,
}

impl DefaultSchema {
    /// Wraps `inner`, substituting `value` for absent input.
    pub fn new(inner: impl SchemaLike + 'static, value: Value) -> Self {
        Self {
            inner: Arc::new(inner),
            value,
        }
    }
}

impl SchemaLike for DefaultSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if payload.value().is_none() {
            payload.set_value(Some(self.value.clone()));
            return Ok(());
        }
        self.inner.run(payload, path, ctx)?;
        if payload.value().is_none() {
            payload.set_value(Some(self.value.clone()));
        }
        Ok(())
    }

    fn accepts_missing(&self) -> bool {
        true
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        self.inner.literal_values()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }
}

impl ToJsonSchema for DefaultSchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = self.inner.to_json_schema();
        schema["default"] = self.value.clone();
        schema
    }
}

/// Substitutes a raw pre-default for an absent value and validates the
/// substitute through the inner schema.
#[derive(Clone)]
pub struct PrefaultSchema {
    inner: Arc<dyn SchemaLike>,
    value: Value,
}

impl PrefaultSchema {
    /// Wraps `inner`, substituting `value` for absent input before
    /// validation.
    pub fn new(inner: impl SchemaLike + 'static, value: Value) -> Self {
        Self {
            inner: Arc::new(inner),
            value,
        }
    }
}

impl SchemaLike for PrefaultSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if payload.value().is_none() {
            payload.set_value(Some(self.value.clone()));
        }
        self.inner.run(payload, path, ctx)
    }

    fn accepts_missing(&self) -> bool {
        true
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        self.inner.literal_values()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }
}

impl ToJsonSchema for PrefaultSchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = self.inner.to_json_schema();
        schema["default"] = self.value.clone();
        schema
    }
}

/// Layers "required" back onto an otherwise-optional chain: an absent
/// result with no issues becomes an `invalid_type` issue.
#[derive(Clone)]
pub struct NonOptionalSchema {
    inner: Arc<dyn SchemaLike>,
}

impl NonOptionalSchema {
    /// Wraps `inner`, requiring its result to be present.
    pub fn new(inner: impl SchemaLike + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl SchemaLike for NonOptionalSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let before = payload.issue_count();
        self.inner.run(payload, path, ctx)?;
        if payload.issue_count() == before && payload.value().is_none() {
            payload.push(Issue::new(
                IssueKind::InvalidType {
                    expected: "nonoptional",
                    received: "missing",
                },
                path.clone(),
            ));
        }
        Ok(())
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        self.inner.literal_values()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }
}

impl ToJsonSchema for NonOptionalSchema {
    fn to_json_schema(&self) -> Value {
        self.inner.to_json_schema()
    }
}

/// What a catch fallback gets to look at: the original input and the
/// discarded, finalized errors.
pub struct CatchContext<'a> {
    /// The original input value (absent for a missing key).
    pub input: Option<&'a Value>,
    /// The inner schema's finalized errors, about to be discarded.
    pub errors: &'a SchemaErrors,
}

type CatchFn = Arc<dyn Fn(&CatchContext<'_>) -> Value + Send + Sync>;

/// Discards inner failures and substitutes a computed fallback value.
/// Issues are cleared, not reported; the final result is a clean success.
#[derive(Clone)]
pub struct CatchSchema {
    inner: Arc<dyn SchemaLike>,
    fallback: CatchFn,
}

impl CatchSchema {
    /// Wraps `inner`; on failure, `fallback` computes the replacement
    /// value from the original input and the discarded errors.
    pub fn new(
        inner: impl SchemaLike + 'static,
        fallback: impl Fn(&CatchContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(inner),
            fallback: Arc::new(fallback),
        }
    }
}

impl SchemaLike for CatchSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let original = payload.value().cloned();
        let mut child = Payload::new(original.clone());
        self.inner.run(&mut child, path, ctx)?;

        let (value, issues) = child.into_parts();
        if issues.is_empty() {
            payload.set_value(value);
        } else {
            let errors = SchemaErrors::from_vec(issues);
            let fallback = (self.fallback)(&CatchContext {
                input: original.as_ref(),
                errors: &errors,
            });
            payload.set_value(Some(fallback));
        }
        Ok(())
    }

    fn accepts_missing(&self) -> bool {
        self.inner.accepts_missing()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }
}

impl ToJsonSchema for CatchSchema {
    fn to_json_schema(&self) -> Value {
        self.inner.to_json_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, SchemaExt};
    use serde_json::json;

    fn run_missing(schema: &dyn SchemaLike) -> Payload {
        let mut payload = Payload::new(None);
        schema
            .run(&mut payload, &JsonPath::root(), &ParseContext::sync())
            .unwrap();
        payload
    }

    #[test]
    fn test_optional_accepts_missing() {
        let schema = Schema::string().optional();
        let payload = run_missing(&schema);
        assert!(!payload.has_issues());
        assert_eq!(payload.value(), None);
    }

    #[test]
    fn test_optional_still_validates_present_values() {
        let schema = Schema::string().min_len(3).optional();
        assert!(schema.validate(&json!("abc"), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!("ab"), &JsonPath::root()).is_failure());
        // null is not "missing"
        assert!(schema.validate(&json!(null), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_nullable_accepts_null_only() {
        let schema = Schema::string().nullable();
        assert!(schema.validate(&json!(null), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!("x"), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(1), &JsonPath::root()).is_failure());
        assert!(!schema.accepts_missing());
    }

    #[test]
    fn test_default_is_not_revalidated() {
        // the default is shorter than the minimum; it is trusted anyway
        let schema = Schema::string().min_len(5).default_to(json!("x"));
        let payload = run_missing(&schema);
        assert!(!payload.has_issues());
        assert_eq!(payload.value(), Some(&json!("x")));
    }

    #[test]
    fn test_prefault_is_revalidated() {
        let schema = Schema::string().min_len(5).prefault(json!("x"));
        let payload = run_missing(&schema);
        assert!(payload.has_issues());
        assert_eq!(payload.issues()[0].code(), "too_small");
    }

    #[test]
    fn test_prefault_normalizes_raw_substitute() {
        // the prefault value passes through the inner schema's transforms
        let schema = Schema::string().trim().prefault(json!("  raw  "));
        let payload = run_missing(&schema);
        assert!(!payload.has_issues());
        assert_eq!(payload.value(), Some(&json!("raw")));
    }

    #[test]
    fn test_default_reapplied_when_inner_yields_missing() {
        let schema = Schema::string().optional().default_to(json!("fallback"));
        // present value validates normally
        assert_eq!(
            schema
                .validate(&json!("hi"), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!("hi")
        );
        // absent input short-circuits to the default
        let payload = run_missing(&schema);
        assert_eq!(payload.value(), Some(&json!("fallback")));
    }

    #[test]
    fn test_non_optional_requires_presence() {
        let schema = Schema::string().optional().non_optional();
        let payload = run_missing(&schema);
        assert_eq!(payload.issue_count(), 1);
        match &payload.issues()[0].kind {
            IssueKind::InvalidType { expected, .. } => assert_eq!(*expected, "nonoptional"),
            other => panic!("unexpected kind: {other:?}"),
        }

        assert!(schema.validate(&json!("ok"), &JsonPath::root()).is_success());
    }

    #[test]
    fn test_catch_suppresses_but_computes() {
        let schema = Schema::string()
            .refine(|v| v.as_str().is_some_and(|s| s.len() > 3))
            .catch(|ctx| {
                // the fallback sees both the input and the discarded errors
                assert!(ctx.input.is_some());
                assert!(ctx.errors.len() >= 1);
                json!("fallback")
            });

        let result = schema.validate(&json!("ab"), &JsonPath::root());
        assert_eq!(result.into_result().unwrap(), json!("fallback"));

        let result = schema.validate(&json!("long enough"), &JsonPath::root());
        assert_eq!(result.into_result().unwrap(), json!("long enough"));
    }

    #[test]
    fn test_chained_optionals_delegate() {
        let schema = OptionalSchema::new(Schema::string().optional());
        assert!(schema.accepts_missing());
        let payload = run_missing(&schema);
        assert!(!payload.has_issues());
    }

    #[test]
    fn test_nullable_literal_values_include_null() {
        let schema = Schema::literal("on").nullable();
        assert_eq!(
            schema.literal_values(),
            Some(vec![json!("on"), Value::Null])
        );
    }
}
