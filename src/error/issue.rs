//! The issue model: one record per validation failure.
//!
//! Issues are the data validation produces instead of control flow. Schemas
//! and checks append [`Issue`]s to the payload as they run; the parse entry
//! points collect them into a [`SchemaErrors`](crate::SchemaErrors) once the
//! top-level run completes. Messages are NOT baked in at push time: an issue
//! carries an explicit message only when a schema-local override supplied
//! one, and everything else is resolved later through the configured
//! formatter chain (see [`crate::config`]).

use std::fmt::{self, Display};

use serde_json::{Number, Value};

use crate::config::MessageResolver;
use crate::path::JsonPath;

/// Code-specific data for one validation failure.
///
/// A closed tagged sum: every failure the engine can report is one of these
/// variants, and [`IssueKind::code`] yields the stable machine-readable tag.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// The value's structural type did not match the schema.
    InvalidType {
        expected: &'static str,
        received: &'static str,
    },
    /// A numeric value, length, or size exceeded its maximum.
    TooBig {
        origin: &'static str,
        maximum: Number,
        inclusive: bool,
    },
    /// A numeric value, length, or size fell below its minimum.
    TooSmall {
        origin: &'static str,
        minimum: Number,
        inclusive: bool,
    },
    /// A string failed a format or pattern test.
    InvalidFormat {
        format: String,
        pattern: Option<String>,
    },
    /// A number was not an exact multiple of the divisor.
    NotMultipleOf { divisor: Number },
    /// An object carried keys the schema does not declare.
    UnrecognizedKeys { keys: Vec<String> },
    /// No union option accepted the value. `alternatives` holds each
    /// option's own issue list, in option declaration order.
    InvalidUnion {
        alternatives: Vec<Vec<Issue>>,
        note: Option<String>,
    },
    /// A record or map key failed the key schema.
    InvalidKey { issues: Vec<Issue> },
    /// A map entry value failed the value schema.
    InvalidElement { issues: Vec<Issue> },
    /// The value was not one of a finite set of allowed literals.
    InvalidValue { values: Vec<Value> },
    /// A refinement or custom schema rejected the value.
    Custom { params: Option<Value> },
}

impl IssueKind {
    /// The stable machine-readable code for this failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::InvalidType { .. } => "invalid_type",
            IssueKind::TooBig { .. } => "too_big",
            IssueKind::TooSmall { .. } => "too_small",
            IssueKind::InvalidFormat { .. } => "invalid_format",
            IssueKind::NotMultipleOf { .. } => "not_multiple_of",
            IssueKind::UnrecognizedKeys { .. } => "unrecognized_keys",
            IssueKind::InvalidUnion { .. } => "invalid_union",
            IssueKind::InvalidKey { .. } => "invalid_key",
            IssueKind::InvalidElement { .. } => "invalid_element",
            IssueKind::InvalidValue { .. } => "invalid_value",
            IssueKind::Custom { .. } => "custom",
        }
    }
}

/// A single validation failure with full context.
///
/// - **kind**: what went wrong, with code-specific data
/// - **path**: where in the input it went wrong, rooted at the top level
/// - **input**: the offending value (dropped when the config says so)
/// - **message**: explicit schema-local override, if any; resolved through
///   the formatter chain otherwise
///
/// The `proceed` flag records whether later checks on the same schema were
/// allowed to run despite this issue; an issue with a falsy flag puts its
/// schema into the aborted state.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// The failure kind and its data.
    pub kind: IssueKind,
    /// The path to the value that failed validation.
    pub path: JsonPath,
    /// The offending input value, when recorded.
    pub input: Option<Value>,
    message: Option<String>,
    pub(crate) proceed: bool,
}

impl Issue {
    /// Creates a new issue with the given kind and path.
    pub fn new(kind: IssueKind, path: JsonPath) -> Self {
        Self {
            kind,
            path,
            input: None,
            message: None,
            proceed: false,
        }
    }

    /// Shorthand for the most common kind: a structural type mismatch.
    pub fn invalid_type(expected: &'static str, value: Option<&Value>, path: JsonPath) -> Self {
        Self::new(
            IssueKind::InvalidType {
                expected,
                received: type_name(value),
            },
            path,
        )
        .with_input(value.cloned())
    }

    /// Records the offending input value and returns self for chaining.
    pub fn with_input(mut self, input: Option<Value>) -> Self {
        self.input = input;
        self
    }

    /// Sets an explicit message and returns self for chaining.
    ///
    /// An explicit message short-circuits the formatter chain.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Marks this issue as non-aborting: later checks on the same schema
    /// still run.
    pub fn proceeding(mut self) -> Self {
        self.proceed = true;
        self
    }

    /// The machine-readable code, e.g. `invalid_type` or `too_small`.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// The resolved message if one has been attached or finalized, or the
    /// built-in default rendering otherwise.
    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.default_message())
    }

    /// True once a message has been attached or finalized.
    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }

    pub(crate) fn set_message_if_absent(&mut self, message: &str) {
        if self.message.is_none() {
            self.message = Some(message.to_string());
        }
    }

    /// Resolves this issue's message through the formatter chain and
    /// recurses into nested issue lists. Strips the recorded input when the
    /// configuration asks for it.
    pub(crate) fn finalize(&mut self, resolver: &MessageResolver) {
        if self.message.is_none() {
            self.message = Some(resolver.resolve(self));
        }
        if !resolver.include_input() {
            self.input = None;
        }
        match &mut self.kind {
            IssueKind::InvalidUnion { alternatives, .. } => {
                for option_issues in alternatives {
                    for issue in option_issues {
                        issue.finalize(resolver);
                    }
                }
            }
            IssueKind::InvalidKey { issues } | IssueKind::InvalidElement { issues } => {
                for issue in issues {
                    issue.finalize(resolver);
                }
            }
            _ => {}
        }
    }

    /// The built-in English rendering for this issue.
    pub fn default_message(&self) -> String {
        match &self.kind {
            IssueKind::InvalidType { expected, received } => {
                format!("expected {}, received {}", expected, received)
            }
            IssueKind::TooBig {
                origin,
                maximum,
                inclusive,
            } => bound_message(origin, maximum, *inclusive, true),
            IssueKind::TooSmall {
                origin,
                minimum,
                inclusive,
            } => bound_message(origin, minimum, *inclusive, false),
            IssueKind::InvalidFormat { format, pattern } => match (format.as_str(), pattern) {
                ("regex", Some(p)) => format!("must match pattern '{}'", p),
                ("starts_with", Some(p)) => format!("must start with '{}'", p),
                ("ends_with", Some(p)) => format!("must end with '{}'", p),
                ("includes", Some(p)) => format!("must include '{}'", p),
                ("lowercase", _) => "must be lowercase".to_string(),
                ("uppercase", _) => "must be uppercase".to_string(),
                (name, _) => format!("invalid {}", name),
            },
            IssueKind::NotMultipleOf { divisor } => {
                format!("must be a multiple of {}", divisor)
            }
            IssueKind::UnrecognizedKeys { keys } => {
                let quoted: Vec<String> = keys.iter().map(|k| format!("'{}'", k)).collect();
                format!("unrecognized keys: {}", quoted.join(", "))
            }
            IssueKind::InvalidUnion { alternatives, note } => match note {
                Some(note) => note.clone(),
                None => format!("did not match any of {} union options", alternatives.len()),
            },
            IssueKind::InvalidKey { .. } => "invalid key".to_string(),
            IssueKind::InvalidElement { .. } => "invalid element".to_string(),
            IssueKind::InvalidValue { values } => {
                let rendered: Vec<String> = values.iter().map(render_literal).collect();
                if rendered.len() == 1 {
                    format!("must be {}", rendered[0])
                } else {
                    format!("must be one of {}", rendered.join(", "))
                }
            }
            IssueKind::Custom { .. } => "invalid input".to_string(),
        }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{}: {}", path_str, self.message())
    }
}

impl std::error::Error for Issue {}

/// Renders one bound violation, wording adjusted by the bound's origin.
fn bound_message(origin: &str, bound: &Number, inclusive: bool, upper: bool) -> String {
    let (noun, unit) = match origin {
        "string" => ("length", " characters"),
        "array" => ("length", " items"),
        "set" => ("size", " elements"),
        _ => ("value", ""),
    };
    let relation = match (upper, inclusive) {
        (true, true) => "at most",
        (true, false) => "less than",
        (false, true) => "at least",
        (false, false) => "greater than",
    };
    if unit.is_empty() {
        format!("{} must be {} {}", noun, relation, bound)
    } else {
        format!("{} must be {} {}{}", noun, relation, bound, unit)
    }
}

/// Renders a literal for `invalid_value` messages.
fn render_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}

/// The JSON type name for a value slot; an absent slot reads as "missing".
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

// Issue is Send + Sync since all fields are owned types. The assertions keep
// that true if the types change.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issue>();
    assert_sync::<Issue>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_creation() {
        let issue = Issue::invalid_type(
            "string",
            Some(&json!(42)),
            JsonPath::root().push_field("name"),
        );

        assert_eq!(issue.code(), "invalid_type");
        assert_eq!(issue.input, Some(json!(42)));
        assert!(!issue.proceed);
        assert_eq!(
            issue.kind,
            IssueKind::InvalidType {
                expected: "string",
                received: "number"
            }
        );
    }

    #[test]
    fn test_missing_value_reads_as_missing() {
        let issue = Issue::invalid_type("string", None, JsonPath::root());
        match issue.kind {
            IssueKind::InvalidType { received, .. } => assert_eq!(received, "missing"),
            _ => panic!("expected invalid_type"),
        }
    }

    #[test]
    fn test_explicit_message_wins() {
        let issue = Issue::invalid_type("string", Some(&json!(1)), JsonPath::root())
            .with_message("name must be text");
        assert_eq!(issue.message(), "name must be text");
    }

    #[test]
    fn test_default_messages() {
        let issue = Issue::new(
            IssueKind::TooSmall {
                origin: "string",
                minimum: Number::from(3u64),
                inclusive: true,
            },
            JsonPath::root(),
        );
        assert_eq!(issue.message(), "length must be at least 3 characters");

        let issue = Issue::new(
            IssueKind::TooBig {
                origin: "int",
                maximum: Number::from(10),
                inclusive: false,
            },
            JsonPath::root(),
        );
        assert_eq!(issue.message(), "value must be less than 10");

        let issue = Issue::new(
            IssueKind::InvalidValue {
                values: vec![json!("a"), json!("b")],
            },
            JsonPath::root(),
        );
        assert_eq!(issue.message(), "must be one of 'a', 'b'");
    }

    #[test]
    fn test_display_includes_path() {
        let issue = Issue::invalid_type(
            "string",
            Some(&json!(1)),
            JsonPath::root().push_field("user").push_field("name"),
        );
        let display = issue.to_string();
        assert!(display.starts_with("user.name: "));

        let root_issue = Issue::invalid_type("string", Some(&json!(1)), JsonPath::root());
        assert!(root_issue.to_string().starts_with("(root): "));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(Some(&json!(null))), "null");
        assert_eq!(type_name(Some(&json!(true))), "boolean");
        assert_eq!(type_name(Some(&json!(1.5))), "number");
        assert_eq!(type_name(Some(&json!("x"))), "string");
        assert_eq!(type_name(Some(&json!([]))), "array");
        assert_eq!(type_name(Some(&json!({}))), "object");
        assert_eq!(type_name(None), "missing");
    }
}
