//! Boolean, null, and any schemas.

use serde_json::{json, Value};

use crate::checks::Check;
use crate::error::Issue;
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema for validating boolean values.
#[derive(Clone, Default)]
pub struct BooleanSchema {
    checks: Vec<Check>,
    coerce: bool,
    type_error_message: Option<String>,
}

impl BooleanSchema {
    /// Creates a new boolean schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables input coercion: the strings `"true"`/`"false"` and the
    /// numbers `0`/`1` are converted before the type check.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Sets the type error message.
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
}

impl SchemaLike for BooleanSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if self.coerce {
            let coerced = match payload.value() {
                Some(Value::String(s)) if s == "true" => Some(true),
                Some(Value::String(s)) if s == "false" => Some(false),
                Some(Value::Number(n)) if n.as_i64() == Some(0) => Some(false),
                Some(Value::Number(n)) if n.as_i64() == Some(1) => Some(true),
                _ => None,
            };
            if let Some(b) = coerced {
                payload.set_value(Some(Value::Bool(b)));
            }
        }

        if !matches!(payload.value(), Some(Value::Bool(_))) {
            let issue = Issue::invalid_type("boolean", payload.value(), path.clone());
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

    fn literal_values(&self) -> Option<Vec<Value>> {
        Some(vec![Value::Bool(false), Value::Bool(true)])
    }
}

impl ToJsonSchema for BooleanSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "type": "boolean" })
    }
}

/// A schema accepting exactly `null`.
#[derive(Clone, Default)]
pub struct NullSchema {
    type_error_message: Option<String>,
}

impl NullSchema {
    /// Creates a new null schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }
}

impl SchemaLike for NullSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if !matches!(payload.value(), Some(Value::Null)) {
            let issue = Issue::invalid_type("null", payload.value(), path.clone());
            let issue = match &self.type_error_message {
                Some(message) => issue.with_message(message),
                None => issue,
            };
            payload.push(issue);
        }
        Ok(())
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        Some(vec![Value::Null])
    }
}

impl ToJsonSchema for NullSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "type": "null" })
    }
}

/// A schema accepting any value, including an absent one. Useful as a
/// catchall or a refinement base.
#[derive(Clone, Default)]
pub struct AnySchema {
    checks: Vec<Check>,
}

impl AnySchema {
    /// Creates a new any schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a caller-built check.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

impl SchemaLike for AnySchema {
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

    fn accepts_missing(&self) -> bool {
        true
    }
}

impl ToJsonSchema for AnySchema {
    fn to_json_schema(&self) -> Value {
        json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean() {
        let schema = BooleanSchema::new();
        assert!(schema.validate(&json!(true), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(1), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_boolean_coercion() {
        let schema = BooleanSchema::new().coerce();
        assert_eq!(
            schema
                .validate(&json!("true"), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!(true)
        );
        assert_eq!(
            schema
                .validate(&json!(0), &JsonPath::root())
                .into_result()
                .unwrap(),
            json!(false)
        );
        assert!(schema.validate(&json!("yes"), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_null() {
        let schema = NullSchema::new();
        assert!(schema.validate(&json!(null), &JsonPath::root()).is_success());
        assert!(schema.validate(&json!(0), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_any_accepts_everything() {
        let schema = AnySchema::new();
        for value in [json!(null), json!(1), json!("x"), json!([]), json!({})] {
            assert!(schema.validate(&value, &JsonPath::root()).is_success());
        }
        assert!(schema.accepts_missing());
    }
}
