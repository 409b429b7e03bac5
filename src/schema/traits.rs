//! Schema polymorphism: the [`SchemaLike`] trait and the builder
//! extensions every schema type picks up.
//!
//! A schema is a typed validator: a type-specific `parse_value` plus a list
//! of attached [`Check`]s, unified behind the `run` entry point by the
//! checks-runner. Composite schemas hold children as `Arc<dyn SchemaLike>`,
//! so any schema type can appear anywhere a schema is expected.

use std::sync::Arc;

use serde_json::Value;
use stillwater::Validation;

use crate::checks::{Check, RefineCtx};
use crate::config::ParseOptions;
use crate::error::SchemaErrors;
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::schema::custom::RefinedSchema;
use crate::schema::intersection::IntersectionSchema;
use crate::schema::pipe::{PipeSchema, TransformSchema};
use crate::schema::union::UnionSchema;
use crate::schema::wrappers::{
    CatchContext, CatchSchema, DefaultSchema, NonOptionalSchema, NullableSchema, OptionalSchema,
    PrefaultSchema,
};
use crate::validation::{
    execute, run_schema, ParseContext, ParseError, ParseFault, Payload,
};

/// A trait for schema types that validate JSON values.
///
/// Implementors supply the type-specific structural check (`parse_value`)
/// and, optionally, a list of attached checks; everything else — the
/// checks-runner, the parse entry points, optionality and introspection
/// hooks — is provided.
///
/// The `Send + Sync` bounds allow schemas to be shared across threads and
/// used behind `Arc<dyn SchemaLike>`.
pub trait SchemaLike: ToJsonSchema + Send + Sync {
    /// The type-specific structural check. Appends issues to the payload
    /// and may replace its value (coercion, transforms); recursion into
    /// child schemas happens here for composite types.
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault>;

    /// The checks attached to this schema, in attachment order.
    fn checks(&self) -> &[Check] {
        &[]
    }

    /// Runs `parse_value` followed by the attached checks. With no checks
    /// attached this is an alias for `parse_value`.
    fn run(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        run_schema(self, payload, path, ctx)
    }

    /// The finite set of literal values this schema accepts, if statically
    /// known. Drives discriminated-union dispatch and exhaustive record
    /// keys.
    fn literal_values(&self) -> Option<Vec<Value>> {
        None
    }

    /// True if this schema treats an absent value (`None` slot) as valid.
    /// Object validation derives field optionality from this.
    fn accepts_missing(&self) -> bool {
        false
    }

    /// Collects the names of registry references reachable from this
    /// schema, for integrity checking.
    fn collect_refs(&self, _refs: &mut Vec<String>) {}

    /// Validates a value at an explicit path, accumulating all issues.
    ///
    /// This positional entry point is what composite schemas use in tests;
    /// faults (an effectful validator reached synchronously, an
    /// unmergeable intersection) surface as a root-level `custom` issue
    /// here — use [`SchemaLike::safe_parse`] to distinguish them.
    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        let mut payload = Payload::new(Some(value.clone()));
        match self.run(&mut payload, path, &ParseContext::sync()) {
            Ok(()) => {}
            Err(fault) => {
                return Validation::Failure(SchemaErrors::single(
                    crate::error::Issue::new(
                        crate::error::IssueKind::Custom { params: None },
                        path.clone(),
                    )
                    .with_message(fault.to_string()),
                ));
            }
        }
        let (value, issues) = payload.into_parts();
        if issues.is_empty() {
            Validation::Success(value.unwrap_or(Value::Null))
        } else {
            Validation::Failure(SchemaErrors::from_vec(issues))
        }
    }

    /// Parses synchronously, returning the (possibly transformed) value or
    /// the aggregate error. Raises [`ParseFault::AsyncRequired`] if the
    /// schema transitively needs the effectful entry points.
    fn parse(&self, input: &Value) -> Result<Value, ParseError> {
        into_parse_result(execute(self, input, false, &ParseOptions::default()))
    }

    /// Parses synchronously without converting failure into an error:
    /// returns the accumulated `Validation`. Faults are still raised — they
    /// are API misuse, not invalid input.
    fn safe_parse(&self, input: &Value) -> Result<Validation<Value, SchemaErrors>, ParseFault> {
        execute(self, input, false, &ParseOptions::default())
    }

    /// Parses with effectful validators permitted.
    ///
    /// "Async" validators here are blocking-capable closures executed on
    /// the calling thread (independent branches may run on the rayon
    /// pool); there is no future-based scheduler. Issue order still
    /// follows attachment and declaration order.
    fn parse_async(&self, input: &Value) -> Result<Value, ParseError> {
        into_parse_result(execute(self, input, true, &ParseOptions::default()))
    }

    /// Effectful counterpart of [`SchemaLike::safe_parse`].
    fn safe_parse_async(
        &self,
        input: &Value,
    ) -> Result<Validation<Value, SchemaErrors>, ParseFault> {
        execute(self, input, true, &ParseOptions::default())
    }

    /// [`SchemaLike::parse`] with per-call options (error map overrides).
    fn parse_with(&self, input: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
        into_parse_result(execute(self, input, false, options))
    }

    /// [`SchemaLike::safe_parse`] with per-call options.
    fn safe_parse_with(
        &self,
        input: &Value,
        options: &ParseOptions,
    ) -> Result<Validation<Value, SchemaErrors>, ParseFault> {
        execute(self, input, false, options)
    }
}

fn into_parse_result(
    outcome: Result<Validation<Value, SchemaErrors>, ParseFault>,
) -> Result<Value, ParseError> {
    match outcome? {
        Validation::Success(value) => Ok(value),
        Validation::Failure(errors) => Err(ParseError::Invalid(errors)),
    }
}

/// Builder extensions available on every sized schema type: wrappers,
/// pipes, refinements, and set operations.
pub trait SchemaExt: SchemaLike + Sized + 'static {
    /// Treats an absent value as valid. See
    /// [`OptionalSchema`](crate::schema::OptionalSchema).
    fn optional(self) -> OptionalSchema {
        OptionalSchema::new(self)
    }

    /// Treats an explicit `null` as valid.
    fn nullable(self) -> NullableSchema {
        NullableSchema::new(self)
    }

    /// Substitutes `value` for an absent input WITHOUT validating it
    /// through the inner schema; defaults are trusted.
    fn default_to(self, value: Value) -> DefaultSchema {
        DefaultSchema::new(self, value)
    }

    /// Substitutes `value` for an absent input and validates the
    /// substitute through the inner schema.
    fn prefault(self, value: Value) -> PrefaultSchema {
        PrefaultSchema::new(self, value)
    }

    /// Requires the inner result to be present, layering "required" onto
    /// an otherwise-optional chain.
    fn non_optional(self) -> NonOptionalSchema {
        NonOptionalSchema::new(self)
    }

    /// Discards inner failures and substitutes the fallback's value; the
    /// fallback sees the original input and the discarded errors.
    fn catch(self, fallback: impl Fn(&CatchContext<'_>) -> Value + Send + Sync + 'static) -> CatchSchema {
        CatchSchema::new(self, fallback)
    }

    /// Chains this schema into `output`: the output side runs only when
    /// this side did not abort.
    fn pipe<O: SchemaLike + 'static>(self, output: O) -> PipeSchema {
        PipeSchema::new(self, output)
    }

    /// Pipes this schema into a value transform.
    fn transform(
        self,
        f: impl Fn(Value, &mut RefineCtx) -> Value + Send + Sync + 'static,
    ) -> PipeSchema {
        PipeSchema::new(self, TransformSchema::new(f))
    }

    /// Attaches a refinement predicate; a falsy result produces one
    /// `custom` issue. Chain `.error(...)` for the message.
    fn refine(self, test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> RefinedSchema {
        RefinedSchema::new(self).with_check(crate::checks::custom(test, None))
    }

    /// Attaches a super-refinement with direct access to an issue sink.
    fn refine_with(
        self,
        test: impl Fn(&Value, &mut RefineCtx) + Send + Sync + 'static,
    ) -> RefinedSchema {
        RefinedSchema::new(self).with_check(crate::checks::custom_with(test))
    }

    /// Attaches an effectful refinement: it may perform I/O and only runs
    /// through `parse_async`/`safe_parse_async`.
    fn refine_async(self, test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> RefinedSchema {
        RefinedSchema::new(self).with_check(crate::checks::custom(test, None).effectful())
    }

    /// Intersects this schema with another: both validate the same input
    /// and the outputs deep-merge.
    fn and<O: SchemaLike + 'static>(self, other: O) -> IntersectionSchema {
        IntersectionSchema::new(self, other)
    }

    /// Unions this schema with another: first match wins.
    fn or<O: SchemaLike + 'static>(self, other: O) -> UnionSchema {
        UnionSchema::new().option(self).option(other)
    }
}

impl<S: SchemaLike + Sized + 'static> SchemaExt for S {}

/// Shared handle to a type-erased schema.
pub type SchemaHandle = Arc<dyn SchemaLike>;
