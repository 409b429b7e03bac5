//! The check primitive: one composable validation rule.
//!
//! A [`Check`] inspects the payload and appends issues; it may also replace
//! the payload value (the `overwrite` family, used for trim and
//! case-folding transforms so they compose with validation ordering).
//! Checks attach to a schema and run after its type-specific parse, in
//! attachment order, under the rules of
//! [`run_schema`](crate::validation::run_schema).
//!
//! Constructors in this module build the built-in rules; schema builder
//! methods call them and record the resolved bounds in the schema's
//! [`Bag`] for introspection and JSON Schema export.

use std::sync::Arc;

use regex::Regex;
use serde_json::{Number, Value};

use crate::error::{Issue, IssueKind};
use crate::path::JsonPath;
use crate::schema::SchemaLike;
use crate::validation::{ParseContext, ParseFault, Payload};

/// The body of a check.
pub type CheckFn =
    Arc<dyn Fn(&mut Payload, &JsonPath, &ParseContext) -> Result<(), ParseFault> + Send + Sync>;

/// A check's run-condition predicate.
pub type WhenFn = Arc<dyn Fn(&Payload) -> bool + Send + Sync>;

/// A single composable validation rule attached to a schema.
///
/// - `when`: if present, decides whether the check runs regardless of prior
///   abort state; if absent, the check is skipped once the payload aborted.
/// - `abort`: an issue from this check puts the payload into the aborted
///   state, preventing later `when`-less checks from running.
/// - `effectful`: the check may perform I/O and only runs through the
///   `parse_async` entry points.
/// - `message`: schema-local override stamped onto issues this check emits.
#[derive(Clone)]
pub struct Check {
    run: CheckFn,
    when: Option<WhenFn>,
    abort: bool,
    effectful: bool,
    message: Option<String>,
}

impl Check {
    /// Creates a check from a fallible body (one that runs sub-schemas and
    /// can therefore hit a fault).
    pub fn new(
        run: impl Fn(&mut Payload, &JsonPath, &ParseContext) -> Result<(), ParseFault>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            run: Arc::new(run),
            when: None,
            abort: false,
            effectful: false,
            message: None,
        }
    }

    /// Creates a check from an infallible body; most built-ins only look at
    /// the payload.
    pub fn simple(run: impl Fn(&mut Payload, &JsonPath) + Send + Sync + 'static) -> Self {
        Self::new(move |payload, path, _ctx| {
            run(payload, path);
            Ok(())
        })
    }

    /// Sets the run-condition predicate.
    pub fn with_when(mut self, when: impl Fn(&Payload) -> bool + Send + Sync + 'static) -> Self {
        self.when = Some(Arc::new(when));
        self
    }

    /// Marks this check as aborting: an issue from it stops later checks.
    pub fn aborting(mut self) -> Self {
        self.abort = true;
        self
    }

    /// Marks this check as effectful (I/O-performing).
    pub fn effectful(mut self) -> Self {
        self.effectful = true;
        self
    }

    /// Sets the schema-local message override.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replaces the message override in place; used by the `.error()`
    /// builder idiom.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub(crate) fn when(&self) -> Option<&WhenFn> {
        self.when.as_ref()
    }

    /// True if an issue from this check aborts later checks.
    pub fn aborts(&self) -> bool {
        self.abort
    }

    /// True if this check requires the effectful entry points.
    pub fn is_effectful(&self) -> bool {
        self.effectful
    }

    /// The schema-local message override, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub(crate) fn invoke(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        (self.run)(payload, path, ctx)
    }
}

/// Collected issue-reporting context handed to super-refinements and
/// transforms.
///
/// Issues added here are appended to the payload when the refinement
/// returns; the default path is the refinement's own location.
pub struct RefineCtx {
    path: JsonPath,
    issues: Vec<Issue>,
}

impl RefineCtx {
    pub(crate) fn new(path: &JsonPath) -> Self {
        Self {
            path: path.clone(),
            issues: Vec::new(),
        }
    }

    /// The path of the value under refinement.
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Reports a custom issue at the refinement's own path.
    pub fn add_issue(&mut self, message: impl Into<String>) {
        let issue = Issue::new(IssueKind::Custom { params: None }, self.path.clone())
            .with_message(message);
        self.issues.push(issue);
    }

    /// Reports a custom issue at an explicit path (build it from
    /// [`RefineCtx::path`] for sub-locations).
    pub fn add_issue_at(&mut self, path: JsonPath, message: impl Into<String>) {
        let issue = Issue::new(IssueKind::Custom { params: None }, path).with_message(message);
        self.issues.push(issue);
    }

    /// Reports a fully built issue of any shape.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub(crate) fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// Cached metadata populated when built-in checks attach to a schema.
///
/// Consumed by introspection and the JSON Schema exporter; never read on
/// the validation hot path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bag {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<Number>,
    pub exclusive_maximum: Option<Number>,
    pub multiple_of: Option<Number>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
    pub pattern: Option<String>,
    pub format: Option<String>,
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn number_of(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// A numeric upper-bound check (`lt`/`lte`).
pub fn less_than(maximum: Number, inclusive: bool, origin: &'static str) -> Check {
    let bound = as_f64(&maximum);
    Check::simple(move |payload, path| {
        let Some(value) = payload.value() else { return };
        let Some(n) = number_of(value) else { return };
        let ok = if inclusive { n <= bound } else { n < bound };
        if !ok {
            let issue = Issue::new(
                IssueKind::TooBig {
                    origin,
                    maximum: maximum.clone(),
                    inclusive,
                },
                path.clone(),
            )
            .with_input(Some(value.clone()));
            payload.push(issue);
        }
    })
}

/// A numeric lower-bound check (`gt`/`gte`).
pub fn greater_than(minimum: Number, inclusive: bool, origin: &'static str) -> Check {
    let bound = as_f64(&minimum);
    Check::simple(move |payload, path| {
        let Some(value) = payload.value() else { return };
        let Some(n) = number_of(value) else { return };
        let ok = if inclusive { n >= bound } else { n > bound };
        if !ok {
            let issue = Issue::new(
                IssueKind::TooSmall {
                    origin,
                    minimum: minimum.clone(),
                    inclusive,
                },
                path.clone(),
            )
            .with_input(Some(value.clone()));
            payload.push(issue);
        }
    })
}

/// An exact-divisibility check.
pub fn multiple_of(divisor: Number) -> Check {
    Check::simple(move |payload, path| {
        let Some(value) = payload.value() else { return };
        let Some(n) = value.as_number() else { return };
        let divisible = match (n.as_i64(), divisor.as_i64()) {
            (Some(v), Some(d)) if d != 0 => v % d == 0,
            _ => {
                let v = as_f64(n);
                let d = as_f64(&divisor);
                d != 0.0 && ((v / d) - (v / d).round()).abs() < 1e-9
            }
        };
        if !divisible {
            let issue = Issue::new(
                IssueKind::NotMultipleOf {
                    divisor: divisor.clone(),
                },
                path.clone(),
            )
            .with_input(Some(value.clone()));
            payload.push(issue);
        }
    })
}

/// The element count a length/size check observes: characters for strings,
/// items for arrays.
fn measured_len(value: &Value) -> Option<(usize, &'static str)> {
    match value {
        Value::String(s) => Some((s.chars().count(), "string")),
        Value::Array(a) => Some((a.len(), "array")),
        _ => None,
    }
}

fn push_length_issue(
    payload: &mut Payload,
    path: &JsonPath,
    origin: &'static str,
    bound: usize,
    upper: bool,
    input: Value,
) {
    let bound = Number::from(bound);
    let kind = if upper {
        IssueKind::TooBig {
            origin,
            maximum: bound,
            inclusive: true,
        }
    } else {
        IssueKind::TooSmall {
            origin,
            minimum: bound,
            inclusive: true,
        }
    };
    payload.push(Issue::new(kind, path.clone()).with_input(Some(input)));
}

/// A minimum length check over strings and arrays.
pub fn min_length(min: usize) -> Check {
    Check::simple(move |payload, path| {
        let Some(value) = payload.value() else { return };
        let Some((len, origin)) = measured_len(value) else {
            return;
        };
        if len < min {
            let input = value.clone();
            push_length_issue(payload, path, origin, min, false, input);
        }
    })
}

/// A maximum length check over strings and arrays.
pub fn max_length(max: usize) -> Check {
    Check::simple(move |payload, path| {
        let Some(value) = payload.value() else { return };
        let Some((len, origin)) = measured_len(value) else {
            return;
        };
        if len > max {
            let input = value.clone();
            push_length_issue(payload, path, origin, max, true, input);
        }
    })
}

/// An exact length check over strings and arrays; mismatches surface as
/// `too_big` or `too_small` against the exact bound.
pub fn exact_length(len: usize) -> Check {
    Check::simple(move |payload, path| {
        let Some(value) = payload.value() else { return };
        let Some((actual, origin)) = measured_len(value) else {
            return;
        };
        if actual != len {
            let input = value.clone();
            push_length_issue(payload, path, origin, len, actual > len, input);
        }
    })
}

/// A minimum size check for set schemas (observes the deduplicated array).
pub fn min_size(min: usize) -> Check {
    Check::simple(move |payload, path| {
        let Some(Value::Array(items)) = payload.value() else {
            return;
        };
        if items.len() < min {
            let input = Value::Array(items.clone());
            push_length_issue(payload, path, "set", min, false, input);
        }
    })
}

/// A maximum size check for set schemas.
pub fn max_size(max: usize) -> Check {
    Check::simple(move |payload, path| {
        let Some(Value::Array(items)) = payload.value() else {
            return;
        };
        if items.len() > max {
            let input = Value::Array(items.clone());
            push_length_issue(payload, path, "set", max, true, input);
        }
    })
}

fn push_format_issue(
    payload: &mut Payload,
    path: &JsonPath,
    format: &str,
    pattern: Option<String>,
    input: Value,
) {
    let issue = Issue::new(
        IssueKind::InvalidFormat {
            format: format.to_string(),
            pattern,
        },
        path.clone(),
    )
    .with_input(Some(input));
    payload.push(issue);
}

/// A regex pattern check. The regex is compiled once, at attach time.
pub fn pattern(regex: Regex) -> Check {
    Check::simple(move |payload, path| {
        let Some(Value::String(s)) = payload.value() else {
            return;
        };
        if !regex.is_match(s) {
            let input = Value::String(s.clone());
            push_format_issue(
                payload,
                path,
                "regex",
                Some(regex.as_str().to_string()),
                input,
            );
        }
    })
}

/// A string-predicate check reporting the given literal on failure; backs
/// `starts_with`, `ends_with` and `includes`.
fn literal_check(
    format: &'static str,
    literal: String,
    test: impl Fn(&str, &str) -> bool + Send + Sync + 'static,
) -> Check {
    Check::simple(move |payload, path| {
        let Some(Value::String(s)) = payload.value() else {
            return;
        };
        if !test(s, &literal) {
            let input = Value::String(s.clone());
            push_format_issue(payload, path, format, Some(literal.clone()), input);
        }
    })
}

/// Requires the string to start with the given prefix.
pub fn starts_with(prefix: impl Into<String>) -> Check {
    literal_check("starts_with", prefix.into(), |s, lit| s.starts_with(lit))
}

/// Requires the string to end with the given suffix.
pub fn ends_with(suffix: impl Into<String>) -> Check {
    literal_check("ends_with", suffix.into(), |s, lit| s.ends_with(lit))
}

/// Requires the string to contain the given substring.
pub fn includes(substring: impl Into<String>) -> Check {
    literal_check("includes", substring.into(), |s, lit| s.contains(lit))
}

/// Requires the string to equal its lowercase folding.
pub fn lowercase() -> Check {
    Check::simple(|payload, path| {
        let Some(Value::String(s)) = payload.value() else {
            return;
        };
        if *s != s.to_lowercase() {
            let input = Value::String(s.clone());
            push_format_issue(payload, path, "lowercase", None, input);
        }
    })
}

/// Requires the string to equal its uppercase folding.
pub fn uppercase() -> Check {
    Check::simple(|payload, path| {
        let Some(Value::String(s)) = payload.value() else {
            return;
        };
        if *s != s.to_uppercase() {
            let input = Value::String(s.clone());
            push_format_issue(payload, path, "uppercase", None, input);
        }
    })
}

/// A named string-format check (`email`, `uuid`, ...) with a predicate
/// resolved at attach time.
pub fn format(name: &'static str, test: impl Fn(&str) -> bool + Send + Sync + 'static) -> Check {
    Check::simple(move |payload, path| {
        let Some(Value::String(s)) = payload.value() else {
            return;
        };
        if !test(s) {
            let input = Value::String(s.clone());
            push_format_issue(payload, path, name, None, input);
        }
    })
}

/// Unconditionally replaces the payload value via a pure function.
///
/// String transforms (trim, case folding) are overwrite checks so they
/// compose with validation order: a `min_len` attached after `trim`
/// observes the trimmed value.
pub fn overwrite(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Check {
    Check::simple(move |payload, _path| {
        if let Some(value) = payload.take_value() {
            payload.set_value(Some(f(value)));
        }
    })
}

/// Validates a named sub-property of an object value against a sub-schema,
/// reporting issues at the property's path. Cross-field validation without
/// a full nested schema; the property value is not rewritten.
pub fn property(name: impl Into<String>, schema: Arc<dyn SchemaLike>) -> Check {
    let name = name.into();
    Check::new(move |payload, path, ctx| {
        let Some(Value::Object(map)) = payload.value() else {
            return Ok(());
        };
        let mut child = Payload::new(map.get(&name).cloned());
        schema.run(&mut child, &path.push_field(&name), ctx)?;
        let (_, issues) = child.into_parts();
        for issue in issues {
            payload.push(issue);
        }
        Ok(())
    })
}

/// A refinement predicate; a falsy result synthesizes one `custom` issue.
pub fn custom(
    test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    params: Option<Value>,
) -> Check {
    Check::simple(move |payload, path| {
        let Some(value) = payload.value() else { return };
        if !test(value) {
            let issue = Issue::new(
                IssueKind::Custom {
                    params: params.clone(),
                },
                path.clone(),
            )
            .with_input(Some(value.clone()));
            payload.push(issue);
        }
    })
}

/// A super-refinement: receives the value and a [`RefineCtx`] and may push
/// arbitrarily many issues of any shape.
pub fn custom_with(test: impl Fn(&Value, &mut RefineCtx) + Send + Sync + 'static) -> Check {
    Check::simple(move |payload, path| {
        let Some(value) = payload.value().cloned() else {
            return;
        };
        let mut refine = RefineCtx::new(path);
        test(&value, &mut refine);
        for issue in refine.into_issues() {
            payload.push(issue);
        }
    })
}
