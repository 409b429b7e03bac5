//! Process-wide configuration and message resolution.
//!
//! Issue messages are resolved lazily: an issue pushed during validation
//! carries no message unless a schema-local override supplied one. When the
//! error object is built, each remaining message is resolved through the
//! chain
//!
//! 1. per-parse error map ([`ParseOptions::error_map`])
//! 2. global error map ([`Config::error_map`])
//! 3. locale formatter ([`Config::locale`], built-in English when unset)
//!
//! The global [`Config`] is shared mutable state with last-writer-wins
//! semantics. Set it once at startup, before validation runs from multiple
//! logical flows, and treat it as read-only afterwards.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Issue;

/// A message formatter: returns `Some` to supply a message for the issue,
/// `None` to defer to the next formatter in the chain.
pub type MessageFn = Arc<dyn Fn(&Issue) -> Option<String> + Send + Sync>;

/// Process-wide validation configuration.
#[derive(Clone)]
pub struct Config {
    /// Custom error map consulted for every issue lacking a schema-local
    /// or per-parse message.
    pub error_map: Option<MessageFn>,
    /// Locale formatter; the built-in English formatter applies when unset.
    pub locale: Option<MessageFn>,
    /// When false, offending input values are stripped from finalized
    /// issues before they surface.
    pub include_input: bool,
}

impl Config {
    /// A configuration with no custom formatters that records input values.
    pub fn new() -> Self {
        Self {
            error_map: None,
            locale: None,
            include_input: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: RwLock<Option<Config>> = RwLock::new(None);

/// Replaces the global configuration (last writer wins).
pub fn configure(config: Config) {
    *GLOBAL.write() = Some(config);
}

/// Restores the default global configuration.
pub fn reset_config() {
    *GLOBAL.write() = None;
}

/// A snapshot of the current global configuration.
pub fn global_config() -> Config {
    GLOBAL.read().clone().unwrap_or_else(Config::new)
}

/// Per-call options for the `parse_with`/`safe_parse_with` entry points.
#[derive(Clone, Default)]
pub struct ParseOptions {
    /// Error map consulted before the global one for this call only.
    pub error_map: Option<MessageFn>,
}

impl ParseOptions {
    /// Options with no per-call overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-call error map.
    pub fn with_error_map(mut self, error_map: MessageFn) -> Self {
        self.error_map = Some(error_map);
        self
    }
}

/// The formatter chain captured at error-object construction time.
///
/// Snapshotting the global config here, rather than at issue-push time, is
/// what keeps message resolution lazy: a schema reused under a different
/// configuration produces messages from the configuration active when its
/// errors are finalized.
pub(crate) struct MessageResolver {
    parse_map: Option<MessageFn>,
    config: Config,
}

impl MessageResolver {
    pub(crate) fn new(parse_map: Option<MessageFn>) -> Self {
        Self {
            parse_map,
            config: global_config(),
        }
    }

    pub(crate) fn resolve(&self, issue: &Issue) -> String {
        if let Some(message) = self.parse_map.as_ref().and_then(|f| f(issue)) {
            return message;
        }
        if let Some(message) = self.config.error_map.as_ref().and_then(|f| f(issue)) {
            return message;
        }
        if let Some(message) = self.config.locale.as_ref().and_then(|f| f(issue)) {
            return message;
        }
        issue.default_message()
    }

    pub(crate) fn include_input(&self) -> bool {
        self.config.include_input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;
    use crate::path::JsonPath;
    use serde_json::json;

    fn sample_issue() -> Issue {
        Issue::invalid_type("string", Some(&json!(1)), JsonPath::root())
    }

    #[test]
    fn test_default_chain_falls_through_to_english() {
        let resolver = MessageResolver::new(None);
        assert_eq!(
            resolver.resolve(&sample_issue()),
            "expected string, received number"
        );
    }

    #[test]
    fn test_parse_map_takes_precedence() {
        let resolver = MessageResolver::new(Some(Arc::new(|_| Some("per-call".to_string()))));
        assert_eq!(resolver.resolve(&sample_issue()), "per-call");
    }

    #[test]
    fn test_formatter_can_defer_by_code() {
        let map: MessageFn = Arc::new(|issue: &Issue| match issue.kind {
            IssueKind::InvalidType { .. } => Some("wrong type".to_string()),
            _ => None,
        });
        let resolver = MessageResolver::new(Some(map));

        assert_eq!(resolver.resolve(&sample_issue()), "wrong type");

        let other = Issue::new(IssueKind::Custom { params: None }, JsonPath::root());
        assert_eq!(other.default_message(), resolver.resolve(&other));
    }
}
