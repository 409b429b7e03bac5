//! String schema validation.
//!
//! [`StringSchema`] validates string values with length, pattern, format
//! and case constraints, plus overwrite transforms (trim, case folding)
//! that compose with validation order. All constraint violations are
//! accumulated rather than short-circuiting on the first failure.

use regex::Regex;
use serde_json::{json, Value};

use crate::checks::{self, Bag, Check};
use crate::error::Issue;
use crate::interop::{format_to_json_schema, ToJsonSchema};
use crate::path::JsonPath;
use crate::validation::{ParseContext, ParseFault, Payload};

use super::traits::SchemaLike;

/// A schema for validating string values.
///
/// # Example
///
/// ```rust
/// use scrutiny::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::string().min_len(3).max_len(20);
///
/// let result = schema.validate(&json!("hello"), &JsonPath::root());
/// assert!(result.is_success());
///
/// // Violations accumulate: too short AND pattern mismatch both report
/// let schema = Schema::string().min_len(5).pattern(r"^\d+$").unwrap();
/// let result = schema.validate(&json!("ab"), &JsonPath::root());
/// assert!(result.is_failure());
/// ```
#[derive(Clone, Default)]
pub struct StringSchema {
    checks: Vec<Check>,
    bag: Bag,
    coerce: bool,
    type_error_message: Option<String>,
}

impl StringSchema {
    /// Creates a new string schema with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables input coercion: numbers and booleans are converted to their
    /// string renderings before the type check.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Adds a minimum length constraint (Unicode scalar values).
    pub fn min_len(mut self, min: usize) -> Self {
        self.bag.min_length = Some(min);
        self.checks.push(checks::min_length(min));
        self
    }

    /// Adds a maximum length constraint (Unicode scalar values).
    pub fn max_len(mut self, max: usize) -> Self {
        self.bag.max_length = Some(max);
        self.checks.push(checks::max_length(max));
        self
    }

    /// Adds an exact length constraint.
    pub fn len(mut self, len: usize) -> Self {
        self.bag.min_length = Some(len);
        self.bag.max_length = Some(len);
        self.checks.push(checks::exact_length(len));
        self
    }

    /// Adds a regex pattern constraint. The pattern is compiled once, here
    /// at attach time; an invalid pattern is a construction error.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.bag.pattern = Some(pattern.to_string());
        self.checks.push(checks::pattern(regex));
        Ok(self)
    }

    /// Requires the string to start with `prefix`.
    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.checks.push(checks::starts_with(prefix));
        self
    }

    /// Requires the string to end with `suffix`.
    pub fn ends_with(mut self, suffix: impl Into<String>) -> Self {
        self.checks.push(checks::ends_with(suffix));
        self
    }

    /// Requires the string to contain `substring`.
    pub fn includes(mut self, substring: impl Into<String>) -> Self {
        self.checks.push(checks::includes(substring));
        self
    }

    /// Requires the string to equal its lowercase folding.
    pub fn lowercase(mut self) -> Self {
        self.checks.push(checks::lowercase());
        self
    }

    /// Requires the string to equal its uppercase folding.
    pub fn uppercase(mut self) -> Self {
        self.checks.push(checks::uppercase());
        self
    }

    /// Requires a plausible email address.
    pub fn email(self) -> Self {
        self.format("email", is_email)
    }

    /// Requires a URL with an explicit scheme.
    pub fn url(self) -> Self {
        self.format("url", is_url)
    }

    /// Requires a hyphenated UUID.
    pub fn uuid(self) -> Self {
        self.format("uuid", is_uuid)
    }

    /// Requires an IPv4 address.
    pub fn ipv4(self) -> Self {
        self.format("ipv4", |s| s.parse::<std::net::Ipv4Addr>().is_ok())
    }

    /// Requires an IPv6 address.
    pub fn ipv6(self) -> Self {
        self.format("ipv6", |s| s.parse::<std::net::Ipv6Addr>().is_ok())
    }

    /// Requires a calendar date in `YYYY-MM-DD` form.
    pub fn date(self) -> Self {
        self.format("date", is_date)
    }

    /// Requires an RFC 3339 style timestamp.
    pub fn datetime(self) -> Self {
        self.format("datetime", is_datetime)
    }

    fn format(
        mut self,
        name: &'static str,
        test: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.bag.format = Some(name.to_string());
        self.checks.push(checks::format(name, test));
        self
    }

    /// Trims surrounding whitespace. An overwrite transform: checks
    /// attached after it observe the trimmed value.
    pub fn trim(mut self) -> Self {
        self.checks.push(checks::overwrite(|value| match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        }));
        self
    }

    /// Folds the value to lowercase (overwrite transform).
    pub fn lower(mut self) -> Self {
        self.checks.push(checks::overwrite(|value| match value {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other,
        }));
        self
    }

    /// Folds the value to uppercase (overwrite transform).
    pub fn upper(mut self) -> Self {
        self.checks.push(checks::overwrite(|value| match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        }));
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

impl SchemaLike for StringSchema {
    fn parse_value(
        &self,
        payload: &mut Payload,
        path: &JsonPath,
        _ctx: &ParseContext,
    ) -> Result<(), ParseFault> {
        if self.coerce {
            let coerced = match payload.value() {
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(Value::Bool(b)) => Some(b.to_string()),
                _ => None,
            };
            if let Some(s) = coerced {
                payload.set_value(Some(Value::String(s)));
            }
        }

        if !matches!(payload.value(), Some(Value::String(_))) {
            let issue = Issue::invalid_type("string", payload.value(), path.clone());
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

impl ToJsonSchema for StringSchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = json!({ "type": "string" });
        if let Some(min) = self.bag.min_length {
            schema["minLength"] = json!(min);
        }
        if let Some(max) = self.bag.max_length {
            schema["maxLength"] = json!(max);
        }
        if let Some(pattern) = &self.bag.pattern {
            schema["pattern"] = json!(pattern);
        }
        if let Some(format) = &self.bag.format {
            schema["format"] = json!(format_to_json_schema(format));
        }
        schema
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn is_url(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once("://") else {
        return false;
    };
    let scheme_ok = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok && !rest.is_empty() && !rest.contains(char::is_whitespace)
}

fn is_uuid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    s.char_indices().all(|(i, c)| match i {
        8 | 13 | 18 | 23 => c == '-',
        _ => c.is_ascii_hexdigit(),
    })
}

fn is_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| {
        bytes[range].iter().all(|b| b.is_ascii_digit())
    };
    if !digits(0..4) || !digits(5..7) || !digits(8..10) {
        return false;
    }
    let month: u32 = s[5..7].parse().unwrap_or(0);
    let day: u32 = s[8..10].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn is_datetime(s: &str) -> bool {
    let Some((date, time)) = s.split_once('T') else {
        return false;
    };
    if !is_date(date) {
        return false;
    }
    let time = time
        .strip_suffix('Z')
        .or_else(|| time.split_once('+').map(|(t, off)| valid_offset(off).then_some(t)).flatten())
        .or_else(|| {
            // negative offsets: split on the last '-'
            time.rfind('-').and_then(|idx| {
                let (t, off) = time.split_at(idx);
                valid_offset(&off[1..]).then_some(t)
            })
        })
        .unwrap_or(time);
    valid_time(time)
}

fn valid_offset(off: &str) -> bool {
    let bytes = off.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit()
}

fn valid_time(t: &str) -> bool {
    let (hms, frac) = match t.split_once('.') {
        Some((hms, frac)) => (hms, Some(frac)),
        None => (t, None),
    };
    if let Some(frac) = frac {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3 {
        return false;
    }
    let nums: Vec<u32> = parts
        .iter()
        .filter_map(|p| (p.len() == 2).then(|| p.parse().ok()).flatten())
        .collect();
    nums.len() == 3 && nums[0] < 24 && nums[1] < 60 && nums[2] < 61
}
