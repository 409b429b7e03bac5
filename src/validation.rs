//! The execution engine: payload state, parse context, and the checks-runner.
//!
//! A single top-level parse owns one [`Payload`]: the current (possibly
//! transformed) value plus the accumulating issue list. The payload is
//! passed by mutable reference through nested schema calls, which may
//! replace the value or append issues — issues are never removed.
//!
//! [`run_schema`] is the shared algorithm every schema type plugs into: the
//! type-specific parse runs first, then the attached checks in attachment
//! order, skipping checks without a `when` predicate once the payload has
//! aborted.

use std::sync::Arc;

use serde_json::Value;
use stillwater::Validation;

use crate::config::{MessageResolver, ParseOptions};
use crate::error::{Issue, SchemaErrors};
use crate::path::JsonPath;
use crate::schema::SchemaLike;

/// Default maximum reference-resolution depth for recursive schemas.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Mutable validation state for one `run` invocation.
///
/// The value slot is an `Option`: `None` stands for an absent object key
/// (the "undefined" of the JSON world), distinct from `Some(Value::Null)`.
/// Wrapper schemas (optional, default, prefault) and object field handling
/// are defined in terms of this distinction.
#[derive(Debug, Clone)]
pub struct Payload {
    value: Option<Value>,
    issues: Vec<Issue>,
}

impl Payload {
    /// Creates a payload over the given value slot with no issues.
    pub fn new(value: Option<Value>) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    /// The current value slot.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Replaces the value slot (transforms, defaults, coercion).
    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }

    /// Takes the value slot, leaving `None`.
    pub fn take_value(&mut self) -> Option<Value> {
        self.value.take()
    }

    /// Appends one issue. Issues are append-only.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// The issues accumulated so far.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// The number of issues accumulated so far.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// True if any issue has been recorded.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// True once any issue with a falsy proceed flag is present: the
    /// aborted state that skips later checks lacking a `when` predicate.
    pub fn aborted(&self) -> bool {
        self.issues.iter().any(|issue| !issue.proceed)
    }

    /// Appends a child payload's issues and returns its value slot.
    pub fn absorb(&mut self, child: Payload) -> Option<Value> {
        self.issues.extend(child.issues);
        child.value
    }

    /// Post-processes the issues a check just appended: non-aborting checks
    /// mark their issues as proceeding, and the check's message override is
    /// stamped onto issues that carry none.
    pub(crate) fn annotate_from(&mut self, start: usize, proceed: bool, message: Option<&str>) {
        for issue in &mut self.issues[start..] {
            if proceed {
                issue.proceed = true;
            }
            if let Some(message) = message {
                issue.set_message_if_absent(message);
            }
        }
    }

    /// Decomposes the payload into its value slot and issue list.
    pub fn into_parts(self) -> (Option<Value>, Vec<Issue>) {
        (self.value, self.issues)
    }
}

/// Read access to a schema registry during validation.
///
/// Abstracts registry lookup so the engine does not depend on the registry
/// module directly.
pub trait RegistryAccess: Send + Sync {
    /// Gets a schema by name from the registry.
    fn get_schema(&self, name: &str) -> Option<Arc<dyn SchemaLike>>;
}

/// Context threaded through one validation call.
///
/// Carries the sync/effectful mode, the registry for reference resolution,
/// and reference-depth tracking for recursive schemas.
#[derive(Clone)]
pub struct ParseContext {
    allow_effects: bool,
    registry: Option<Arc<dyn RegistryAccess>>,
    depth: usize,
    max_depth: usize,
}

impl ParseContext {
    /// A synchronous context: effectful validators raise
    /// [`ParseFault::AsyncRequired`] the moment one is reached.
    pub fn sync() -> Self {
        Self {
            allow_effects: false,
            registry: None,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// A context that permits effectful validators.
    pub fn effectful() -> Self {
        Self {
            allow_effects: true,
            ..Self::sync()
        }
    }

    /// Attaches a registry for reference resolution.
    pub fn with_registry(mut self, registry: Arc<dyn RegistryAccess>, max_depth: usize) -> Self {
        self.registry = Some(registry);
        self.max_depth = max_depth;
        self
    }

    /// True when effectful validators may run in this context.
    pub fn allows_effects(&self) -> bool {
        self.allow_effects
    }

    /// The registry attached to this context, if any.
    pub fn registry(&self) -> Option<&Arc<dyn RegistryAccess>> {
        self.registry.as_ref()
    }

    /// The current depth of reference traversal.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The maximum allowed reference depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// A context one reference-resolution level deeper.
    pub fn increment_depth(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }
}

/// Conditions that are programmer error rather than invalid input.
///
/// These are raised eagerly — even from the `safe_parse` entry points —
/// instead of accumulating as issues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseFault {
    /// A synchronous entry point reached a validator that requires the
    /// effectful entry points (`parse_async`/`safe_parse_async`).
    #[error("schema requires effectful validation; use parse_async or safe_parse_async")]
    AsyncRequired,

    /// Intersection branches produced values that cannot be merged. The
    /// schema definition is self-contradictory; the input is not at fault.
    #[error("intersection branches produced unmergeable values at '{path}'")]
    Unmergeable {
        /// Where inside the merged output the contradiction was found.
        path: JsonPath,
    },
}

/// Everything `parse` can return on the error side: accumulated validation
/// issues, or a fault.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// The input failed validation.
    #[error(transparent)]
    Invalid(#[from] SchemaErrors),
    /// The schema was misused; see [`ParseFault`].
    #[error(transparent)]
    Fault(#[from] ParseFault),
}

/// The checks-runner: executes a schema's own parse followed by its
/// attached checks in attachment order.
///
/// - With no checks attached this is an alias for the type-specific parse.
/// - A check with a `when` predicate runs exactly when the predicate says,
///   regardless of prior abort state; a check without one is skipped once
///   the payload has aborted.
/// - Issues appended by a non-aborting check are marked as proceeding, so
///   independent checks keep accumulating; an aborting check's issues put
///   the payload into the aborted state.
/// - An effectful check reached while the context disallows effects raises
///   [`ParseFault::AsyncRequired`] immediately.
pub fn run_schema<S: SchemaLike + ?Sized>(
    schema: &S,
    payload: &mut Payload,
    path: &JsonPath,
    ctx: &ParseContext,
) -> Result<(), ParseFault> {
    schema.parse_value(payload, path, ctx)?;

    let checks = schema.checks();
    if checks.is_empty() {
        return Ok(());
    }

    for check in checks {
        let should_run = match check.when() {
            Some(when) => when(payload),
            None => !payload.aborted(),
        };
        if !should_run {
            continue;
        }
        if check.is_effectful() && !ctx.allows_effects() {
            return Err(ParseFault::AsyncRequired);
        }

        let before = payload.issue_count();
        check.invoke(payload, path, ctx)?;
        payload.annotate_from(before, !check.aborts(), check.message());
    }

    Ok(())
}

/// Runs a schema against an input in a fresh context and finalizes the
/// outcome. Shared by all entry points.
pub(crate) fn execute<S: SchemaLike + ?Sized>(
    schema: &S,
    input: &Value,
    allow_effects: bool,
    options: &ParseOptions,
) -> Result<Validation<Value, SchemaErrors>, ParseFault> {
    let ctx = if allow_effects {
        ParseContext::effectful()
    } else {
        ParseContext::sync()
    };
    execute_in(schema, input, &ctx, options)
}

/// Like [`execute`] but in a caller-provided context (registry validation).
pub(crate) fn execute_in<S: SchemaLike + ?Sized>(
    schema: &S,
    input: &Value,
    ctx: &ParseContext,
    options: &ParseOptions,
) -> Result<Validation<Value, SchemaErrors>, ParseFault> {
    let mut payload = Payload::new(Some(input.clone()));
    schema.run(&mut payload, &JsonPath::root(), ctx)?;

    let (value, issues) = payload.into_parts();
    if issues.is_empty() {
        Ok(Validation::Success(value.unwrap_or(Value::Null)))
    } else {
        let resolver = MessageResolver::new(options.error_map.clone());
        Ok(Validation::Failure(SchemaErrors::finalize(
            issues, &resolver,
        )))
    }
}
