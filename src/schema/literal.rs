//! Literal and enumeration schemas.
//!
//! Both expose their accepted values through `literal_values`, which is
//! what discriminated-union dispatch and exhaustive record keys build on.

use serde_json::{json, Value};

use crate::error::{Issue, IssueKind};
use crate::interop::ToJsonSchema;
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema accepting exactly one literal value.
#[derive(Clone)]
pub struct LiteralSchema {
    value: Value,
    type_error_message: Option<String>,
}

impl LiteralSchema {
    /// Creates a schema accepting only `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            type_error_message: None,
        }
    }

    /// The accepted literal.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Sets the mismatch error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }
}

impl SchemaLike for LiteralSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if payload.value() != Some(&self.value) {
            let issue = Issue::new(
                IssueKind::InvalidValue {
                    values: vec![self.value.clone()],
                },
                path.clone(),
            )
            .with_input(payload.value().cloned());
            let issue = match &self.type_error_message {
                Some(message) => issue.with_message(message),
                None => issue,
            };
            payload.push(issue);
        }
        Ok(())
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        Some(vec![self.value.clone()])
    }
}

impl ToJsonSchema for LiteralSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "const": self.value })
    }
}

/// A schema accepting one of a finite set of literal values.
#[derive(Clone)]
pub struct EnumSchema {
    values: Vec<Value>,
    type_error_message: Option<String>,
}

impl EnumSchema {
    /// Creates a schema accepting any of `values`.
    pub fn new(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            type_error_message: None,
        }
    }

    /// The accepted literals, in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Sets the mismatch error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }
}

impl SchemaLike for EnumSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        let matched = payload
            .value()
            .is_some_and(|value| self.values.iter().any(|v| v == value));
        if !matched {
            let issue = Issue::new(
                IssueKind::InvalidValue {
                    values: self.values.clone(),
                },
                path.clone(),
            )
            .with_input(payload.value().cloned());
            let issue = match &self.type_error_message {
                Some(message) => issue.with_message(message),
                None => issue,
            };
            payload.push(issue);
        }
        Ok(())
    }

    fn literal_values(&self) -> Option<Vec<Value>> {
        Some(self.values.clone())
    }
}

impl ToJsonSchema for EnumSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "enum": self.values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_matches_exactly() {
        let schema = LiteralSchema::new("admin");
        assert!(schema.validate(&json!("admin"), &JsonPath::root()).is_success());

        let result = schema.validate(&json!("user"), &JsonPath::root());
        let errors = result.into_result().unwrap_err();
        assert_eq!(errors.first().code(), "invalid_value");
        assert_eq!(errors.first().message(), "must be 'admin'");
    }

    #[test]
    fn test_literal_values_exposed() {
        let schema = LiteralSchema::new(42);
        assert_eq!(schema.literal_values(), Some(vec![json!(42)]));
    }

    #[test]
    fn test_enum_membership() {
        let schema = EnumSchema::new(["red", "green", "blue"]);
        assert!(schema.validate(&json!("green"), &JsonPath::root()).is_success());

        let errors = schema
            .validate(&json!("purple"), &JsonPath::root())
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first().code(), "invalid_value");
    }

    #[test]
    fn test_enum_rejects_missing_and_null() {
        let schema = EnumSchema::new([json!(1), json!(2)]);
        assert!(schema.validate(&json!(null), &JsonPath::root()).is_failure());
    }
}
