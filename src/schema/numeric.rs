//! Numeric schema validation.
//!
//! [`IntegerSchema`] validates integers (floats are rejected, and unsigned
//! values beyond the `i64` envelope surface as a range issue rather than a
//! type issue). [`NumberSchema`] accepts any JSON number; NaN and the
//! infinities cannot occur, the value model does not represent them.

use serde_json::{json, Number, Value};

use crate::checks::{self, Bag, Check};
use crate::error::{Issue, IssueKind};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema for validating integer values.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::integer().min(0).max(100);
///
/// assert!(schema.validate(&json!(50), &JsonPath::root()).is_success());
/// assert!(schema.validate(&json!(-5), &JsonPath::root()).is_failure());
///
/// // Floats are rejected outright
/// assert!(schema.validate(&json!(1.5), &JsonPath::root()).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct IntegerSchema {
    checks: Vec<Check>,
    bag: Bag,
    coerce: bool,
    type_error_message: Option<String>,
}

impl IntegerSchema {
    /// Creates a new integer schema with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables input coercion: strings that parse as integers and booleans
    /// (`0`/`1`) are converted before the type check.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: i64) -> Self {
        self.bag.minimum = Some(Number::from(value));
        self.checks
            .push(checks::greater_than(Number::from(value), true, "int"));
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: i64) -> Self {
        self.bag.maximum = Some(Number::from(value));
        self.checks
            .push(checks::less_than(Number::from(value), true, "int"));
        self
    }

    /// Adds a strict lower bound.
    pub fn gt(mut self, value: i64) -> Self {
        self.bag.exclusive_minimum = Some(Number::from(value));
        self.checks
            .push(checks::greater_than(Number::from(value), false, "int"));
        self
    }

    /// Adds a strict upper bound.
    pub fn lt(mut self, value: i64) -> Self {
        self.bag.exclusive_maximum = Some(Number::from(value));
        self.checks
            .push(checks::less_than(Number::from(value), false, "int"));
        self
    }

    /// Adds both minimum and maximum constraints (inclusive range).
    pub fn range(self, range: std::ops::RangeInclusive<i64>) -> Self {
        self.min(*range.start()).max(*range.end())
    }

    /// The integer must be greater than 0.
    pub fn positive(self) -> Self {
        self.gt(0)
    }

    /// The integer must be greater than or equal to 0.
    pub fn non_negative(self) -> Self {
        self.min(0)
    }

    /// The integer must be less than 0.
    pub fn negative(self) -> Self {
        self.lt(0)
    }

    /// The integer must be an exact multiple of `divisor`.
    pub fn multiple_of(mut self, divisor: i64) -> Self {
        self.bag.multiple_of = Some(Number::from(divisor));
        self.checks.push(checks::multiple_of(Number::from(divisor)));
        self
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

    /// The metadata bag recorded by the attached constraints.
    pub fn bag(&self) -> &Bag {
        &self.bag
    }

    fn push_type_issue(&self, payload: &mut Payload, path: &JsonPath) {
        let issue = Issue::invalid_type("int", payload.value(), path.clone());
        let issue = match &self.type_error_message {
            Some(message) => issue.with_message(message),
            None => issue,
        };
        payload.push(issue);
    }
}

impl SchemaLike for IntegerSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if self.coerce {
            let coerced = match payload.value() {
                Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
                Some(Value::Bool(b)) => Some(i64::from(*b)),
                _ => None,
            };
            if let Some(n) = coerced {
                payload.set_value(Some(json!(n)));
            }
        }

        let overflow = match payload.value() {
            Some(Value::Number(n)) if n.is_i64() => None,
            // a valid integer, but outside the representable envelope
            Some(Value::Number(n)) if n.is_u64() => Some(n.clone()),
            _ => {
                self.push_type_issue(payload, path);
                return Ok(());
            }
        };
        if let Some(n) = overflow {
            let issue = Issue::new(
                IssueKind::TooBig {
                    origin: "int",
                    maximum: Number::from(i64::MAX),
                    inclusive: true,
                },
                path.clone(),
            )
            .with_input(Some(Value::Number(n)));
            payload.push(issue);
        }
        Ok(())
    }

    fn checks(&self) -> &[Check] {
        &self.checks
    }
}

impl ToJsonSchema for IntegerSchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = json!({ "type": "integer" });
        write_numeric_bag(&mut schema, &self.bag);
        schema
    }
}

/// A schema for validating numeric values (integer or float).
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::number().gt(0.0).lte(1.0);
///
/// assert!(schema.validate(&json!(0.25), &JsonPath::root()).is_success());
/// assert!(schema.validate(&json!(0), &JsonPath::root()).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct NumberSchema {
    checks: Vec<Check>,
    bag: Bag,
    coerce: bool,
    type_error_message: Option<String>,
}

impl NumberSchema {
    /// Creates a new number schema with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables input coercion: strings that parse as numbers and booleans
    /// are converted before the type check.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    fn bound(value: f64) -> Number {
        Number::from_f64(value).unwrap_or_else(|| Number::from(0))
    }

    /// Adds an inclusive lower bound.
    pub fn gte(mut self, value: f64) -> Self {
        let bound = Self::bound(value);
        self.bag.minimum = Some(bound.clone());
        self.checks.push(checks::greater_than(bound, true, "number"));
        self
    }

    /// Adds a strict lower bound.
    pub fn gt(mut self, value: f64) -> Self {
        let bound = Self::bound(value);
        self.bag.exclusive_minimum = Some(bound.clone());
        self.checks.push(checks::greater_than(bound, false, "number"));
        self
    }

    /// Adds an inclusive upper bound.
    pub fn lte(mut self, value: f64) -> Self {
        let bound = Self::bound(value);
        self.bag.maximum = Some(bound.clone());
        self.checks.push(checks::less_than(bound, true, "number"));
        self
    }

    /// Adds a strict upper bound.
    pub fn lt(mut self, value: f64) -> Self {
        let bound = Self::bound(value);
        self.bag.exclusive_maximum = Some(bound.clone());
        self.checks.push(checks::less_than(bound, false, "number"));
        self
    }

    /// The number must be greater than 0.
    pub fn positive(self) -> Self {
        self.gt(0.0)
    }

    /// The number must be less than 0.
    pub fn negative(self) -> Self {
        self.lt(0.0)
    }

    /// The number must be an exact multiple of `divisor`.
    pub fn multiple_of(mut self, divisor: f64) -> Self {
        let divisor = Self::bound(divisor);
        self.bag.multiple_of = Some(divisor.clone());
        self.checks.push(checks::multiple_of(divisor));
        self
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

    /// The metadata bag recorded by the attached constraints.
    pub fn bag(&self) -> &Bag {
        &self.bag
    }
}

impl SchemaLike for NumberSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if self.coerce {
            let coerced = match payload.value() {
                Some(Value::String(s)) => s.trim().parse::<f64>().ok().and_then(Number::from_f64),
                Some(Value::Bool(b)) => Some(Number::from(i64::from(*b))),
                _ => None,
            };
            if let Some(n) = coerced {
                payload.set_value(Some(Value::Number(n)));
            }
        }

        if !matches!(payload.value(), Some(Value::Number(_))) {
            let issue = Issue::invalid_type("number", payload.value(), path.clone());
            let issue = match &self.type_error_message {
                Some(message) => issue.with_message(message),
                None => issue,
            };
            payload.push(issue);
        }
        Ok(())
    }

    fn checks(&self) -> &[Check] {
        &self.checks
    }
}

impl ToJsonSchema for NumberSchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = json!({ "type": "number" });
        write_numeric_bag(&mut schema, &self.bag);
        schema
    }
}

fn write_numeric_bag(schema: &mut Value, bag: &Bag) {
    if let Some(min) = &bag.minimum {
        schema["minimum"] = Value::Number(min.clone());
    }
    if let Some(max) = &bag.maximum {
        schema["maximum"] = Value::Number(max.clone());
    }
    if let Some(min) = &bag.exclusive_minimum {
        schema["exclusiveMinimum"] = Value::Number(min.clone());
    }
    if let Some(max) = &bag.exclusive_maximum {
        schema["exclusiveMaximum"] = Value::Number(max.clone());
    }
    if let Some(divisor) = &bag.multiple_of {
        schema["multipleOf"] = Value::Number(divisor.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stillwater::Validation;

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    #[test]
    fn test_integer_accepts_integers_only() {
        let schema = IntegerSchema::new();
        assert!(schema.validate(&json!(42), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(-42), &JsonPath::root()).is_success());

        let errors = unwrap_failure(schema.validate(&json!(1.5), &JsonPath::root()));
        assert_eq!(errors.first().code(), "invalid_type");

        assert!(schema.validate(&json!("5"), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_u64_overflow_is_a_range_issue() {
        let schema = IntegerSchema::new();
        let big = serde_json::Value::Number(Number::from(u64::MAX));
        let errors = unwrap_failure(schema.validate(&big, &JsonPath::root()));
        assert_eq!(errors.first().code(), "too_big");
    }

    #[test]
    fn test_integer_bounds() {
        let schema = IntegerSchema::new().min(0).max(100);
        assert!(schema.validate(&json!(0), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(100), &JsonPath::root()).is_success());

        let errors = unwrap_failure(schema.validate(&json!(-1), &JsonPath::root()));
        assert_eq!(errors.first().code(), "too_small");

        let errors = unwrap_failure(schema.validate(&json!(101), &JsonPath::root()));
        assert_eq!(errors.first().code(), "too_big");
    }

    #[test]
    fn test_sign_shorthands() {
        assert!(IntegerSchema::new()
            .positive()
            .validate(&json!(0), &JsonPath::root())
            .is_failure());
        assert!(IntegerSchema::new()
            .non_negative()
            .validate(&json!(0), &JsonPath::root())
            .is_success());
        assert!(IntegerSchema::new()
            .negative()
            .validate(&json!(-1), &JsonPath::root())
            .is_success());
    }

    #[test]
    fn test_range_and_accumulation() {
        let schema = IntegerSchema::new().range(1..=10).multiple_of(2);
        let errors = unwrap_failure(schema.validate(&json!(13), &JsonPath::root()));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.with_code("too_big").len(), 1);
        assert_eq!(errors.with_code("not_multiple_of").len(), 1);
    }

    #[test]
    fn test_integer_coercion() {
        let schema = IntegerSchema::new().coerce();
        assert_eq!(
            schema
                .validate(&json!("42"), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!(42)
        );
        assert_eq!(
            schema
                .validate(&json!(true), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!(1)
        );
        assert!(schema.validate(&json!("4.5"), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_number_accepts_floats() {
        let schema = NumberSchema::new();
        assert!(schema.validate(&json!(1.5), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(3), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!("3"), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_number_bounds() {
        let schema = NumberSchema::new().gt(0.0).lte(1.0);
        assert!(schema.validate(&json!(0.5), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(1.0), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(0), &JsonPath::root()).is_failure());
        assert!(schema.validate(&json!(1.1), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_number_coercion() {
        let schema = NumberSchema::new().coerce();
        assert_eq!(
            schema
                .validate(&json!("2.5"), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!(2.5)
        );
    }

    #[test]
    fn test_custom_messages() {
        let schema = IntegerSchema::new().min(18).error("must be an adult");
        let errors = unwrap_failure(schema.validate(&json!(16), &JsonPath::root()));
        assert_eq!(errors.first().message(), "must be an adult");
    }

    #[test]
    fn test_to_json_schema() {
        let exported = IntegerSchema::new().min(1).max(5).to_json_schema();
        assert_eq!(exported["type"], json!("integer"));
        assert_eq!(exported["minimum"], json!(1));
        assert_eq!(exported["maximum"], json!(5));

        let exported = NumberSchema::new().gt(0.0).multiple_of(0.5).to_json_schema();
        assert_eq!(exported["exclusiveMinimum"], json!(0.0));
        assert_eq!(exported["multipleOf"], json!(0.5));
    }
}
